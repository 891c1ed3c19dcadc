//! Displays the families and their balances, with a live search box.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    endpoints::{self, format_endpoint},
    family::{Family, list_families},
    html::{
        CREDIT_TEXT_STYLE, DEBIT_TEXT_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        format_currency,
    },
    navigation::NavBar,
};

/// The state needed for the [get_families_page](crate::family::get_families_page) route handler.
#[derive(Debug, Clone)]
pub struct FamiliesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for FamiliesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query string for the families page.
#[derive(Debug, Default, Deserialize)]
pub struct FamiliesQuery {
    /// Only show families whose name contains this text.
    #[serde(default)]
    pub search: String,
}

/// The family data to display in the view
#[derive(Debug, PartialEq)]
struct FamilyTableRow {
    name: String,
    land_area: f64,
    balance_due: f64,
    url: String,
}

impl From<Family> for FamilyTableRow {
    fn from(family: Family) -> Self {
        Self {
            url: format_endpoint(endpoints::FAMILY_VIEW, family.id),
            name: family.name.to_string(),
            land_area: family.land_area,
            balance_due: family.balance_due,
        }
    }
}

/// The text style for a balance: red when money is owed, green when in credit.
pub(crate) fn balance_style(balance_due: f64) -> &'static str {
    if balance_due > 0.0 {
        DEBIT_TEXT_STYLE
    } else if balance_due < 0.0 {
        CREDIT_TEXT_STYLE
    } else {
        ""
    }
}

/// Renders the families page, filtered by `search` when it is given.
pub async fn get_families_page(
    State(state): State<FamiliesPageState>,
    Query(query): Query<FamiliesQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let families: Vec<FamilyTableRow> = list_families(&query.search, &connection)
        .inspect_err(|error| tracing::error!("could not list families: {error}"))?
        .into_iter()
        .map(FamilyTableRow::from)
        .collect();

    Ok(families_view(&families, &query.search).into_response())
}

fn families_view(families: &[FamilyTableRow], search: &str) -> Markup {
    let nav_bar = NavBar::new(endpoints::FAMILIES_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Families" }

                    a href=(endpoints::NEW_FAMILY_VIEW) class=(LINK_STYLE)
                    {
                        "Add Family"
                    }
                }

                input
                    id="search"
                    name="search"
                    type="search"
                    placeholder="Search by name"
                    value=(search)
                    aria-label="Search families by name"
                    autocomplete="off"
                    hx-get=(endpoints::FAMILIES_VIEW)
                    hx-trigger="input changed delay:300ms, search"
                    hx-target="#family-list"
                    hx-select="#family-list"
                    hx-swap="outerHTML"
                    hx-push-url="true"
                    class=(FORM_TEXT_INPUT_STYLE);

                (family_table_view(families, search))
            }
        }
    );

    base("Families", &[], &content)
}

fn family_table_view(families: &[FamilyTableRow], search: &str) -> Markup {
    let table_row = |family: &FamilyTableRow| {
        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                th
                    scope="row"
                    class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
                {
                    a href=(family.url) class=(LINK_STYLE) { (family.name) }
                }

                td class="px-6 py-4 text-right tabular-nums"
                {
                    (family.land_area)
                }

                td class={ "px-6 py-4 text-right tabular-nums " (balance_style(family.balance_due)) }
                {
                    (format_currency(family.balance_due))
                }
            }
        )
    };

    html!(
        section id="family-list" class="w-full overflow-x-auto dark:bg-gray-800"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                        th scope="col" class="px-6 py-3 text-right" { "Land (acres)" }
                        th scope="col" class="px-6 py-3 text-right" { "Balance Due" }
                    }
                }

                tbody
                {
                    @for family in families {
                        (table_row(family))
                    }

                    @if families.is_empty() {
                        tr
                        {
                            td
                                colspan="3"
                                class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                            {
                                @if search.is_empty() {
                                    "No families yet. Add a family "
                                    a href=(endpoints::NEW_FAMILY_VIEW) class=(LINK_STYLE)
                                    {
                                        "here"
                                    }
                                    "."
                                } @else {
                                    "No families match \"" (search) "\"."
                                }
                            }
                        }
                    }
                }
            }
        }
    )
}

#[cfg(test)]
mod families_view_tests {
    use scraper::{ElementRef, Html, Selector};

    use crate::{
        endpoints::{self, format_endpoint},
        family::families_page::{FamilyTableRow, families_view},
        html::format_currency,
        test_utils::assert_valid_html,
    };

    fn row(id: i64, name: &str, land_area: f64, balance_due: f64) -> FamilyTableRow {
        FamilyTableRow {
            name: name.to_owned(),
            land_area,
            balance_due,
            url: format_endpoint(endpoints::FAMILY_VIEW, id),
        }
    }

    fn must_get_table_rows(html: &Html) -> Vec<ElementRef<'_>> {
        html.select(&Selector::parse("#family-list tbody tr").unwrap())
            .collect()
    }

    #[test]
    fn shows_each_family() {
        let families = vec![row(1, "Singh", 2.0, 1000.0), row(2, "Kaur", 1.5, -20.0)];

        let html = Html::parse_document(&families_view(&families, "").into_string());

        assert_valid_html(&html);
        let rows = must_get_table_rows(&html);
        assert_eq!(rows.len(), 2);
        for (row, want) in rows.iter().zip(&families) {
            let text = row.text().collect::<String>();
            assert!(text.contains(&want.name), "got {text:?}");
            assert!(text.contains(&format_currency(want.balance_due)), "got {text:?}");

            let link = row
                .select(&Selector::parse("a").unwrap())
                .next()
                .expect("No link to family found");
            assert_eq!(link.value().attr("href"), Some(want.url.as_str()));
        }
    }

    #[test]
    fn search_box_requests_family_list() {
        let html = Html::parse_document(&families_view(&[], "Sin").into_string());

        let input = html
            .select(&Selector::parse("input[name=search]").unwrap())
            .next()
            .expect("No search input found");
        assert_eq!(input.value().attr("hx-get"), Some(endpoints::FAMILIES_VIEW));
        assert_eq!(input.value().attr("hx-select"), Some("#family-list"));
        assert_eq!(input.value().attr("value"), Some("Sin"));
    }

    #[test]
    fn no_families_links_to_add_family() {
        let html = Html::parse_document(&families_view(&[], "").into_string());

        assert_valid_html(&html);
        let rows = must_get_table_rows(&html);
        assert_eq!(rows.len(), 1);
        let link = rows[0]
            .select(&Selector::parse("a").unwrap())
            .next()
            .expect("No link found");
        assert_eq!(link.value().attr("href"), Some(endpoints::NEW_FAMILY_VIEW));
    }

    #[test]
    fn no_matches_mentions_search() {
        let html = Html::parse_document(&families_view(&[], "Brar").into_string());

        let text = must_get_table_rows(&html)[0].text().collect::<String>();
        assert!(text.contains("No families match \"Brar\""), "got {text:?}");
    }
}
