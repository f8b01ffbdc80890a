//! # Coercer
//!
//! Converts values into their schema's type, post-order, for every node
//! whose schema requests coercion. Only leaves are converted: a wrapped
//! container already matches its container type.

use tparams_core::{types, Error};

use crate::mapper::depth_first_map;
use crate::parameter::ParamTree;
use crate::pipeline::Step;

#[derive(Debug, Default, Clone, Copy)]
pub struct Coercer;

impl Coercer {
    pub fn new() -> Self {
        Self
    }
}

impl Step for Coercer {
    fn name(&self) -> &'static str {
        "coercer"
    }

    fn call(&self, tree: &mut ParamTree<'_>) -> Result<(), Error> {
        depth_first_map(tree, |tree, id| {
            let schema = tree.schema(id);
            if !schema.coerces() || tree.is_wrapped(id) {
                return Ok(());
            }

            let value = tree.value(id);
            match schema.ty().coerce(&value) {
                Ok(coerced) => {
                    tree.set_value(id, coerced);
                    Ok(())
                }
                Err(_) => {
                    let actual = types::for_value(&value, &[])
                        .map_or_else(|_| "unknown".to_string(), |t| t.humanize());
                    Err(Error::invalid(
                        format!("failed to coerce {actual} to {}", schema.ty().humanize()),
                        tree.path(id),
                        schema.source(),
                    ))
                }
            }
        })
    }
}
