use std::{any::type_name, sync::Arc};

use crate::{
    errors::ResolveError,
    types::{Injectable, Instance, Token},
};

/// Resolved arguments handed to a constructor or factory, in parameter order
pub struct Arguments {
    owner: Token,
    values: Vec<Instance>,
    position: usize,
}

impl Arguments {
    pub(crate) fn new(owner: Token, values: Vec<Instance>) -> Self {
        Arguments {
            owner,
            values,
            position: 0,
        }
    }

    /// Takes the next argument, downcast to `T`
    pub fn take<T: Injectable>(&mut self) -> Result<Arc<T>, ResolveError> {
        self.take_instance()?
            .downcast::<T>()
            .map_err(|actual_type| ResolveError::DowncastFailed {
                required_type: type_name::<T>(),
                actual_type,
            })
    }

    /// Takes the next argument without downcasting it
    pub fn take_instance(&mut self) -> Result<Instance, ResolveError> {
        let index = self.position;
        let instance = self
            .values
            .get(index)
            .cloned()
            .ok_or_else(|| ResolveError::MissingArgument {
                owner: self.owner.clone(),
                index,
                available: self.values.len(),
            })?;

        self.position += 1;
        Ok(instance)
    }

    /// The token of the type or provider being constructed
    pub fn owner(&self) -> &Token {
        &self.owner
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
