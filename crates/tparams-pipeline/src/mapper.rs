//! Depth-first, post-order traversal.
//!
//! Children are visited before their parent and the root is visited last,
//! so a visitor deciding a container's shape sees its children already
//! renamed, coerced or deleted. Each container's children are snapshotted
//! before descending: a node deleted by an earlier sibling's visit is
//! skipped, and nodes added during the walk are not visited.

use tparams_core::Error;

use crate::parameter::{NodeId, ParamTree};

/// Visit every live node of `tree` in post-order.
///
/// # Errors
///
/// Stops at, and returns, the first error produced by `visit`.
pub fn depth_first_map<'s, F>(tree: &mut ParamTree<'s>, mut visit: F) -> Result<(), Error>
where
    F: FnMut(&mut ParamTree<'s>, NodeId) -> Result<(), Error>,
{
    let root = tree.root();
    walk(tree, root, &mut visit)
}

fn walk<'s, F>(tree: &mut ParamTree<'s>, id: NodeId, visit: &mut F) -> Result<(), Error>
where
    F: FnMut(&mut ParamTree<'s>, NodeId) -> Result<(), Error>,
{
    for child in tree.children(id) {
        if !tree.is_detached(child) {
            walk(tree, child, visit)?;
        }
    }
    visit(tree, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameterizer::Parameterizer;
    use serde_json::json;
    use tparams_core::{Configuration, Value};
    use tparams_schema::{Options, Schema};

    #[test]
    fn test_post_order_visitation() {
        let schema = Schema::build_with(
            Options::new().children(|s| {
                s.param("foo", Options::of("hash").children(|s| {
                    s.param("bar", Options::of("array").children(|s| {
                        s.items(Options::of("hash").children(|s| {
                            s.param("baz", Options::of("integer"));
                        }));
                    }));
                    s.param("qux", Options::of("array").children(|s| {
                        s.items(Options::of("hash").children(|s| {
                            s.param("quux", Options::of("integer"));
                        }));
                    }));
                }));
            }),
            None,
            &Configuration::default(),
        )
        .unwrap();
        let input = json!({
            "foo": {
                "bar": [{"baz": 1}, {"baz": 2}, {"baz": 3}],
                "qux": [{"quux": 1}, {"quux": 2}, {"quux": 3}],
            }
        });
        let mut tree = Parameterizer::with_config(&schema, Configuration::default())
            .call(Value::from(input))
            .unwrap()
            .unwrap();

        let mut visited = Vec::new();
        depth_first_map(&mut tree, |tree, id| {
            visited.push(tree.path(id).to_string());
            Ok(())
        })
        .unwrap();

        assert_eq!(
            visited,
            vec![
                "foo.bar[0].baz",
                "foo.bar[0]",
                "foo.bar[1].baz",
                "foo.bar[1]",
                "foo.bar[2].baz",
                "foo.bar[2]",
                "foo.bar",
                "foo.qux[0].quux",
                "foo.qux[0]",
                "foo.qux[1].quux",
                "foo.qux[1]",
                "foo.qux[2].quux",
                "foo.qux[2]",
                "foo.qux",
                "foo",
                "",
            ]
        );
    }

    #[test]
    fn test_skips_siblings_deleted_mid_walk() {
        let schema = Schema::build_with(
            Options::new().children(|s| {
                s.params(["a", "b", "c"], Options::of("integer"));
            }),
            None,
            &Configuration::default(),
        )
        .unwrap();
        let mut tree = Parameterizer::with_config(&schema, Configuration::default())
            .call(Value::from(json!({"a": 1, "b": 2, "c": 3})))
            .unwrap()
            .unwrap();

        let mut visited = Vec::new();
        depth_first_map(&mut tree, |tree, id| {
            visited.push(tree.path(id).to_string());
            if tree.key(id).as_name() == Some("a") {
                let root = tree.root();
                if let Some(b) = tree.child(root, &"b".into()) {
                    tree.delete(b)?;
                }
            }
            Ok(())
        })
        .unwrap();

        assert_eq!(visited, vec!["a", "c", ""]);
    }

    #[test]
    fn test_stops_at_first_error() {
        let schema = Schema::build_with(
            Options::new().children(|s| {
                s.params(["a", "b"], Options::of("integer"));
            }),
            None,
            &Configuration::default(),
        )
        .unwrap();
        let mut tree = Parameterizer::with_config(&schema, Configuration::default())
            .call(Value::from(json!({"a": 1, "b": 2})))
            .unwrap()
            .unwrap();

        let mut visits = 0;
        let result = depth_first_map(&mut tree, |_, _| {
            visits += 1;
            Err(Error::RootDeletion)
        });
        assert!(result.is_err());
        assert_eq!(visits, 1);
    }
}
