//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/families/{family_id}', use [format_endpoint].

/// The root route which redirects to the family list.
pub const ROOT: &str = "/";
/// The page listing every family, with a search box.
pub const FAMILIES_VIEW: &str = "/families";
/// The page for adding a family.
pub const NEW_FAMILY_VIEW: &str = "/families/new";
/// The page showing a family's balance and history.
pub const FAMILY_VIEW: &str = "/families/{family_id}";
/// The page for charging a periodic fee to every family.
pub const NEW_COLLECTION_VIEW: &str = "/collections/new";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to add a family.
pub const FAMILIES_API: &str = "/api/families";
/// The route to record a payment from a family.
pub const FAMILY_PAYMENTS_API: &str = "/api/families/{family_id}/payments";
/// The route to charge a periodic fee to every family.
pub const COLLECTIONS_API: &str = "/api/collections";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/families/{family_id}', '{family_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
