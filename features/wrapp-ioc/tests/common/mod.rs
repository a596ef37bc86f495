#![allow(dead_code)]

use std::{convert::Infallible, sync::Arc};

use tracing_subscriber::EnvFilter;
use wrapp_ioc::{Describe, MetadataRegistry, ResolveError, TypeDescriptor};

/// Routes log output through the test harness, set `RUST_LOG` to see it
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// No dependencies
#[derive(Debug)]
pub struct A;
impl Describe for A {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::new(|_| Ok::<_, Infallible>(A)).service()
    }
}

/// Depends on [A]
#[derive(Debug)]
pub struct B {
    pub a: Arc<A>,
}
impl Describe for B {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::new(|args| Ok::<_, ResolveError>(B { a: args.take()? }))
            .param::<A>()
            .service()
    }
}

/// Takes a named config value and [B]
#[derive(Debug)]
pub struct C {
    pub name: Arc<String>,
    pub b: Arc<B>,
}
impl Describe for C {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::new(|args| {
            Ok::<_, ResolveError>(C {
                name: args.take()?,
                b: args.take()?,
            })
        })
        .param::<String>()
        .param::<B>()
        .inject(0, "name")
        .service()
        .controller()
    }
}

/// Metadata with [A], [B] and [C] registered
pub fn metadata() -> Arc<MetadataRegistry> {
    init_tracing();

    let metadata = MetadataRegistry::new();
    metadata.register::<A>().unwrap();
    metadata.register::<B>().unwrap();
    metadata.register::<C>().unwrap();
    Arc::new(metadata)
}
