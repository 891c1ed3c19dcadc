//! The page for a single family: its balance, its history and a form for
//! recording a payment.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    database_id::FamilyId,
    endpoints::{self, format_endpoint},
    family::{Family, families_page::balance_style, get_family},
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, CREDIT_TEXT_STYLE, DEBIT_TEXT_STYLE, FieldAttributes,
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, form_field, format_currency, loading_spinner, rupee_input_styles,
    },
    navigation::NavBar,
    transaction::{Transaction, TransactionKind, list_transactions},
    validation::{PaymentForm, ValidationErrors},
};

/// The state needed for the [get_family_page](crate::family::get_family_page) route handler.
#[derive(Debug, Clone)]
pub struct FamilyPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for FamilyPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for the family `family_id`, or the 404 page if there is no such family.
pub async fn get_family_page(
    State(state): State<FamilyPageState>,
    Path(family_id): Path<FamilyId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let family = get_family(family_id, &connection)?;
    let transactions = list_transactions(family_id, &connection)
        .inspect_err(|error| tracing::error!("could not get history of family {family_id}: {error}"))?;

    Ok(family_view(&family, &transactions).into_response())
}

fn family_view(family: &Family, transactions: &[Transaction]) -> Markup {
    let nav_bar = NavBar::new(endpoints::FAMILY_VIEW).into_html();
    let payment_form =
        payment_form_view(family.id, &PaymentForm::default(), &ValidationErrors::default());

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full lg:max-w-5xl space-y-6"
            {
                a href=(endpoints::FAMILIES_VIEW) class=(LINK_STYLE) { "Back to Families" }

                section class=(CARD_STYLE) data-family-summary="true"
                {
                    h1 class="text-2xl font-bold" { (family.name) }

                    dl class="mt-2 grid grid-cols-2 gap-2 text-sm"
                    {
                        dt class="text-gray-500 dark:text-gray-400" { "Land area" }
                        dd class="text-right tabular-nums" { (family.land_area) " acres" }

                        dt class="text-gray-500 dark:text-gray-400" { "Balance due" }
                        dd
                            class={ "text-right tabular-nums font-semibold " (balance_style(family.balance_due)) }
                            data-balance-due=(family.balance_due)
                        {
                            (format_currency(family.balance_due))
                        }
                    }
                }

                section class=(CARD_STYLE) { (payment_form) }

                section class="space-y-2"
                {
                    h2 class="text-xl font-bold" { "History" }
                    (history_table_view(transactions))
                }
            }
        }
    );

    base(family.name.as_ref(), &[rupee_input_styles()], &content)
}

fn history_table_view(transactions: &[Transaction]) -> Markup {
    let table_row = |transaction: &Transaction| {
        let (sign, style) = match transaction.kind {
            TransactionKind::Debit => ("+", DEBIT_TEXT_STYLE),
            TransactionKind::Credit => ("-", CREDIT_TEXT_STYLE),
        };

        html!(
            tr class=(TABLE_ROW_STYLE) data-kind=(transaction.kind)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    time datetime=(transaction.date_time) { (transaction.date_time) }
                }

                td class=(TABLE_CELL_STYLE) { (transaction.description) }

                td class={ "px-6 py-4 text-right tabular-nums " (style) }
                {
                    (sign) (format_currency(transaction.amount))
                }
            }
        )
    };

    html!(
        div class="w-full overflow-x-auto dark:bg-gray-800"
        {
            table id="history" class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class="px-6 py-3 text-right" { "Amount" }
                    }
                }

                tbody
                {
                    @for transaction in transactions {
                        (table_row(transaction))
                    }

                    @if transactions.is_empty() {
                        tr
                        {
                            td
                                colspan="3"
                                class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                            {
                                "No transactions yet."
                            }
                        }
                    }
                }
            }
        }
    )
}

/// The form for recording a payment from the family `family_id`.
pub(crate) fn payment_form_view(
    family_id: FamilyId,
    form: &PaymentForm,
    errors: &ValidationErrors,
) -> Markup {
    let payment_endpoint = format_endpoint(endpoints::FAMILY_PAYMENTS_API, family_id);
    let spinner = loading_spinner();

    html!(
        form
            hx-post=(payment_endpoint)
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4"
        {
            h2 class="text-xl font-bold" { "Record Payment" }

            (form_field(
                "amount",
                "Amount",
                &form.amount,
                errors.get("amount"),
                FieldAttributes {
                    placeholder: "0.00",
                    required: true,
                    numeric: true,
                    currency: true,
                    ..Default::default()
                },
            ))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span id="indicator" class="inline htmx-indicator" { (spinner) }
                " Record Payment"
            }
        }
    )
}
