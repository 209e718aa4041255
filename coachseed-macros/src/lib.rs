use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Data, DeriveInput, Error, Fields, Ident, LitBool, LitStr, Result, parse_macro_input, spanned::Spanned,
};

mod parsed;

use parsed::ParsedModel;

/// Derive `coachseed::types::Model` for a document struct.
///
/// Container attributes:
/// - `#[coach(collection = "users")]` overrides the pluralized snake_case collection name.
/// - `#[coach(register = false)]` keeps the model out of the global model registry.
///
/// Field attributes:
/// - `#[coach(id)]` marks the `String` document id (exactly one required).
/// - `#[coach(unique)]` declares a natural key.
/// - `#[coach(index)]`, `#[coach(index(text))]`, `#[coach(index(numeric, sortable))]` declare search index fields.
/// - `#[coach(created_at)]` / `#[coach(updated_at)]` mark `DateTime<Utc>` timestamps maintained by the repo.
///
/// ```text
/// #[derive(Model, Serialize, Deserialize)]
/// #[coach(collection = "roles")]
/// pub struct Role {
///     #[coach(id)]
///     pub id: String,
///     #[coach(unique, index(numeric, sortable))]
///     pub code: i32,
///     #[coach(created_at)]
///     pub created_at: DateTime<Utc>,
/// }
/// ```
#[proc_macro_derive(Model, attributes(coach))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match ParsedModel::from_input(&input) {
        Ok(parsed) => parsed.emit().into(),
        Err(err) => err.to_compile_error().into(),
    }
}
