use crate::resolve::FieldDescriptor;

/// One layout row: a full-width field, or one or two half-width fields.
#[derive(Clone, Debug)]
pub struct FieldGroup {
    pub fields: Vec<FieldDescriptor>,
}

impl FieldGroup {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn is_split(&self) -> bool {
        self.fields.len() > 1
    }
}

/// Pairs consecutive half-width fields into rows, preserving field order.
pub fn group_fields(fields: impl IntoIterator<Item = FieldDescriptor>) -> Vec<FieldGroup> {
    let mut groups = Vec::new();
    let mut pending: Option<FieldDescriptor> = None;

    for field in fields {
        if field.half_width {
            match pending.take() {
                Some(first) => groups.push(FieldGroup {
                    fields: vec![first, field],
                }),
                None => pending = Some(field),
            }
        } else {
            if let Some(first) = pending.take() {
                groups.push(FieldGroup {
                    fields: vec![first],
                });
            }
            groups.push(FieldGroup {
                fields: vec![field],
            });
        }
    }

    if let Some(last) = pending {
        groups.push(FieldGroup { fields: vec![last] });
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::group_fields;
    use crate::meta::{FieldMeta, MetadataRegistry};
    use crate::resolve::resolve_fields;
    use crate::schema::z;

    fn keys(groups: &[super::FieldGroup]) -> Vec<Vec<String>> {
        groups
            .iter()
            .map(|group| {
                group
                    .fields
                    .iter()
                    .map(|field| field.key.to_string())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn pairs_consecutive_half_width_fields() {
        let mut registry = MetadataRegistry::new();
        let half = |registry: &mut MetadataRegistry| {
            z::string().register(registry, FieldMeta::new().half_width(true))
        };
        let schema = z::object([
            ("a", half(&mut registry)),
            ("b", half(&mut registry)),
            ("c", half(&mut registry)),
            ("d", z::string()),
        ]);

        let fields = resolve_fields(&schema, &registry).expect("fields resolve");
        let groups = group_fields(fields);
        assert_eq!(
            keys(&groups),
            vec![vec!["a", "b"], vec!["c"], vec!["d"]]
        );
        assert!(groups[0].is_split());
    }

    #[test]
    fn full_width_field_flushes_pending_half() {
        let mut registry = MetadataRegistry::new();
        let schema = z::object([
            (
                "first",
                z::string().register(&mut registry, FieldMeta::new().half_width(true)),
            ),
            ("bio", z::string()),
            (
                "last",
                z::string().register(&mut registry, FieldMeta::new().half_width(true)),
            ),
        ]);

        let fields = resolve_fields(&schema, &registry).expect("fields resolve");
        assert_eq!(
            keys(&group_fields(fields)),
            vec![vec!["first"], vec!["bio"], vec!["last"]]
        );
    }

    #[test]
    fn empty_input_yields_no_groups() {
        assert!(group_fields(Vec::new()).is_empty());
    }
}
