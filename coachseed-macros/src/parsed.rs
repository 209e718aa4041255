use super::*;

pub(crate) struct ParsedModel {
    name: Ident,
    collection: String,
    register: bool,
    id_field: Ident,
    created_at: Option<Ident>,
    updated_at: Option<Ident>,
    natural_keys: Vec<String>,
    indexes: Vec<ParsedIndex>,
}

struct ParsedIndex {
    field: String,
    kind: IndexKind,
    sortable: bool,
}

#[derive(Clone, Copy)]
enum IndexKind {
    Tag,
    Text,
    Numeric,
}

#[derive(Default)]
struct FieldAttrs {
    is_id: bool,
    unique: bool,
    created_at: bool,
    updated_at: bool,
    index: Option<ParsedIndex>,
}

impl ParsedModel {
    pub(crate) fn from_input(input: &DeriveInput) -> Result<Self> {
        if !input.generics.params.is_empty() {
            return Err(Error::new(input.generics.span(), "Model cannot be derived for generic structs"));
        }

        let mut collection: Option<String> = None;
        let mut register = true;

        for attr in &input.attrs {
            if !attr.path().is_ident("coach") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("collection") {
                    let value: LitStr = meta.value()?.parse()?;
                    if value.value().is_empty() {
                        return Err(meta.error("collection name cannot be empty"));
                    }
                    collection = Some(value.value());
                    Ok(())
                } else if meta.path.is_ident("register") {
                    let value: LitBool = meta.value()?.parse()?;
                    register = value.value;
                    Ok(())
                } else {
                    Err(meta.error("unknown coach container attribute, expected `collection` or `register`"))
                }
            })?;
        }

        let named = match &input.data {
            Data::Struct(data) => match &data.fields {
                Fields::Named(named) => &named.named,
                _ => return Err(Error::new(input.ident.span(), "Model requires named fields")),
            },
            _ => return Err(Error::new(input.ident.span(), "Model can only be derived for structs")),
        };

        let mut id_field: Option<Ident> = None;
        let mut created_at: Option<Ident> = None;
        let mut updated_at: Option<Ident> = None;
        let mut natural_keys = Vec::new();
        let mut indexes = Vec::new();

        for field in named {
            let Some(ident) = field.ident.clone() else {
                continue;
            };
            let attrs = FieldAttrs::from_field(field)?;

            if attrs.is_id {
                if id_field.is_some() {
                    return Err(Error::new(ident.span(), "Model allows exactly one #[coach(id)] field"));
                }
                id_field = Some(ident.clone());
            }
            if attrs.created_at {
                if created_at.is_some() {
                    return Err(Error::new(ident.span(), "duplicate #[coach(created_at)] field"));
                }
                created_at = Some(ident.clone());
            }
            if attrs.updated_at {
                if updated_at.is_some() {
                    return Err(Error::new(ident.span(), "duplicate #[coach(updated_at)] field"));
                }
                updated_at = Some(ident.clone());
            }
            if attrs.unique {
                natural_keys.push(ident.to_string());
            }
            if let Some(mut index) = attrs.index {
                index.field = ident.to_string();
                indexes.push(index);
            }
        }

        let Some(id_field) = id_field else {
            return Err(Error::new(input.ident.span(), "Model requires one field marked #[coach(id)]"));
        };

        let collection = collection.unwrap_or_else(|| default_collection_name(&input.ident.to_string()));

        Ok(Self {
            name: input.ident.clone(),
            collection,
            register,
            id_field,
            created_at,
            updated_at,
            natural_keys,
            indexes,
        })
    }

    pub(crate) fn emit(&self) -> TokenStream2 {
        let name = &self.name;
        let type_name = name.to_string();
        let collection = &self.collection;
        let id_field = &self.id_field;
        let id_field_name = id_field.to_string();
        let natural_keys = &self.natural_keys;

        let index_fields = self.indexes.iter().map(|index| {
            let field = &index.field;
            let sortable = index.sortable;
            let kind = match index.kind {
                IndexKind::Tag => quote! { ::coachseed::types::IndexKind::Tag },
                IndexKind::Text => quote! { ::coachseed::types::IndexKind::Text },
                IndexKind::Numeric => quote! { ::coachseed::types::IndexKind::Numeric },
            };
            quote! {
                ::coachseed::types::IndexField {
                    field: #field,
                    kind: #kind,
                    sortable: #sortable,
                }
            }
        });

        let stamp_created = self.created_at.as_ref().map(|field| {
            quote! {
                if created {
                    self.#field = now;
                }
            }
        });
        let stamp_updated = self.updated_at.as_ref().map(|field| {
            quote! {
                self.#field = now;
            }
        });

        let registration = if self.register {
            quote! {
                ::coachseed::inventory::submit! {
                    ::coachseed::registry::ModelRegistration {
                        type_name: #type_name,
                        collection: #collection,
                        descriptor_fn: <#name as ::coachseed::types::Model>::descriptor,
                    }
                }
            }
        } else {
            quote! {}
        };

        quote! {
            impl ::coachseed::types::Model for #name {
                const COLLECTION: &'static str = #collection;

                fn descriptor() -> ::coachseed::types::ModelDescriptor {
                    const NATURAL_KEYS: &[&str] = &[#(#natural_keys),*];
                    const INDEXES: &[::coachseed::types::IndexField] = &[#(#index_fields),*];
                    ::coachseed::types::ModelDescriptor {
                        type_name: #type_name,
                        collection: #collection,
                        id_field: #id_field_name,
                        natural_keys: NATURAL_KEYS,
                        indexes: INDEXES,
                    }
                }

                fn id(&self) -> &str {
                    &self.#id_field
                }

                fn set_id(&mut self, id: ::std::string::String) {
                    self.#id_field = id;
                }

                fn stamp(&mut self, now: ::coachseed::chrono::DateTime<::coachseed::chrono::Utc>, created: bool) {
                    let _ = (&now, created);
                    #stamp_created
                    #stamp_updated
                }
            }

            #registration
        }
    }
}

impl FieldAttrs {
    fn from_field(field: &syn::Field) -> Result<Self> {
        let mut attrs = FieldAttrs::default();

        for attr in &field.attrs {
            if !attr.path().is_ident("coach") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("id") {
                    attrs.is_id = true;
                    Ok(())
                } else if meta.path.is_ident("unique") {
                    attrs.unique = true;
                    Ok(())
                } else if meta.path.is_ident("created_at") {
                    attrs.created_at = true;
                    Ok(())
                } else if meta.path.is_ident("updated_at") {
                    attrs.updated_at = true;
                    Ok(())
                } else if meta.path.is_ident("index") {
                    let mut index = ParsedIndex {
                        field: String::new(),
                        kind: IndexKind::Tag,
                        sortable: false,
                    };
                    if meta.input.peek(syn::token::Paren) {
                        meta.parse_nested_meta(|option| {
                            if option.path.is_ident("tag") {
                                index.kind = IndexKind::Tag;
                            } else if option.path.is_ident("text") {
                                index.kind = IndexKind::Text;
                            } else if option.path.is_ident("numeric") {
                                index.kind = IndexKind::Numeric;
                            } else if option.path.is_ident("sortable") {
                                index.sortable = true;
                            } else {
                                return Err(option.error("unknown index option, expected tag, text, numeric or sortable"));
                            }
                            Ok(())
                        })?;
                    }
                    attrs.index = Some(index);
                    Ok(())
                } else {
                    Err(meta.error("unknown coach field attribute"))
                }
            })?;
        }

        Ok(attrs)
    }
}

/// `LogEntry` -> `log_entries`, `Role` -> `roles`.
fn default_collection_name(type_name: &str) -> String {
    let mut snake = String::with_capacity(type_name.len() + 4);
    for (index, ch) in type_name.chars().enumerate() {
        if ch.is_uppercase() {
            if index > 0 {
                snake.push('_');
            }
            snake.extend(ch.to_lowercase());
        } else {
            snake.push(ch);
        }
    }

    if let Some(stem) = snake.strip_suffix('y')
        && !stem.ends_with(['a', 'e', 'i', 'o', 'u'])
    {
        return format!("{stem}ies");
    }
    if snake.ends_with('s') || snake.ends_with('x') || snake.ends_with("ch") || snake.ends_with("sh") {
        return format!("{snake}es");
    }
    format!("{snake}s")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pluralizes_collection_names() {
        assert_eq!(default_collection_name("Role"), "roles");
        assert_eq!(default_collection_name("LogEntry"), "log_entries");
        assert_eq!(default_collection_name("Day"), "days");
        assert_eq!(default_collection_name("Status"), "statuses");
        assert_eq!(default_collection_name("CoachingSession"), "coaching_sessions");
    }

    #[test]
    fn parses_field_attributes() {
        let input: DeriveInput = syn::parse_quote! {
            #[coach(collection = "accounts")]
            struct Account {
                #[coach(id)]
                id: String,
                #[coach(unique, index(numeric, sortable))]
                code: i32,
                #[coach(index(text))]
                name: String,
                #[coach(created_at)]
                created_at: DateTime<Utc>,
            }
        };

        let parsed = ParsedModel::from_input(&input).expect("valid model");
        assert_eq!(parsed.collection, "accounts");
        assert_eq!(parsed.id_field, "id");
        assert_eq!(parsed.natural_keys, vec!["code".to_string()]);
        assert_eq!(parsed.indexes.len(), 2);
        assert!(parsed.indexes[0].sortable);
        assert!(matches!(parsed.indexes[1].kind, IndexKind::Text));
        assert!(parsed.created_at.is_some());
        assert!(parsed.updated_at.is_none());
    }

    #[test]
    fn rejects_missing_id() {
        let input: DeriveInput = syn::parse_quote! {
            struct Orphan {
                name: String,
            }
        };
        assert!(ParsedModel::from_input(&input).is_err());
    }

    #[test]
    fn rejects_unknown_index_option() {
        let input: DeriveInput = syn::parse_quote! {
            struct Place {
                #[coach(id)]
                id: String,
                #[coach(index(geo))]
                location: String,
            }
        };
        assert!(ParsedModel::from_input(&input).is_err());
    }
}
