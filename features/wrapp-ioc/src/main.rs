use std::{error::Error, sync::Arc};

use tracing_subscriber::EnvFilter;
use wrapp_ioc::{
    Describe, MetadataRegistry, ModuleDefinition, ProviderSpec, ResolveError, Token,
    TypeDescriptor,
};

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let metadata = Arc::new(MetadataRegistry::new());
    metadata.register::<Database>()?;
    metadata.register::<UserRepository>()?;
    metadata.register::<UserController>()?;

    ModuleDefinition::new::<DataModule>()
        .provider(
            ProviderSpec::new("database_url").use_value(String::from("postgres://localhost/app")),
        )
        .service::<Database>()
        .service::<UserRepository>()
        .export_service::<UserRepository>()
        .define(metadata.clone())?;

    let app = ModuleDefinition::new::<AppModule>()
        .import::<DataModule>()
        .provider(
            ProviderSpec::new("greeting")
                .use_factory(|args| {
                    let url = args.take::<String>()?;
                    Ok::<_, ResolveError>(format!("Serving users from {url}"))
                })
                .deps([Token::from("database_url")]),
        )
        .controller::<UserController>()
        .define(metadata.clone())?;

    println!("{:?}", app);
    let controller = app.get_controller::<UserController>()?;
    println!("{}", controller.greeting);
    println!("{:?}", controller.repository.find(1));
    Ok(())
}

struct DataModule;
struct AppModule;

#[derive(Debug)]
struct Database {
    url: Arc<String>,
}
impl Describe for Database {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::new(|args| Ok::<_, ResolveError>(Database { url: args.take()? }))
            .param::<String>()
            .inject(0, "database_url")
            .service()
    }
}

#[derive(Debug)]
struct UserRepository {
    database: Arc<Database>,
}
impl UserRepository {
    fn find(&self, id: u32) -> String {
        format!("user {id} @ {}", self.database.url)
    }
}
impl Describe for UserRepository {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::new(|args| {
            Ok::<_, ResolveError>(UserRepository {
                database: args.take()?,
            })
        })
        .param::<Database>()
        .service()
    }
}

struct UserController {
    greeting: Arc<String>,
    repository: Arc<UserRepository>,
}
impl Describe for UserController {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::new(|args| {
            Ok::<_, ResolveError>(UserController {
                greeting: args.take()?,
                repository: args.take()?,
            })
        })
        .param::<String>()
        .param::<UserRepository>()
        .inject(0, "greeting")
        .controller()
    }
}
