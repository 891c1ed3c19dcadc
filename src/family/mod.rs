//! Families, the households whose dues are tracked, and the pages for
//! listing, adding and viewing them.

mod core;
mod create_endpoint;
mod create_page;
mod detail_page;
mod families_page;

pub use core::{
    Family, FamilyName, NewFamily, count_families, create_family_table, get_family,
    list_families,
};
pub use create_endpoint::add_family_endpoint;
pub use create_page::get_add_family_page;
pub use detail_page::get_family_page;
pub use families_page::get_families_page;

pub(crate) use core::{adjust_balance, insert_family};
pub(crate) use detail_page::payment_form_view;
