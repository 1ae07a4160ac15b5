//! Declarative service registration for fixtures and smoke wiring.
//!
//! # Responsibility
//! - Install lazy bindings under well-known keys.
//! - Register each binding's prerequisites first, so any single operation is
//!   safe to call on its own.
//!
//! # Invariants
//! - Registration never constructs a service.
//! - Calling an operation again overwrites its keys (last writer wins).
//! - Keys a factory reads but does not register itself fail only when the
//!   consuming key is resolved.

use crate::components::acl::Acl;
use crate::components::auth::{Authenticator, AuthenticatorOptions, Authorizer};
use crate::components::cache::CachePool;
use crate::components::console::{Console, ConsoleOutput, ConsoleReader, ConsoleSystem, ConsoleUtil};
use crate::components::email::Email;
use crate::components::factory::{FactoryArguments, FactoryError, GenericFactory, ResolverOptions};
use crate::components::locale::{LocaleStructure, LocalesManager, Translator};
use crate::components::logger::ServiceLogger;
use crate::components::metadata::MetadataLoader;
use crate::components::model::{
    CollectionLoader, DatabaseSource, Model, Property, PropertyDisplay,
};
use crate::components::ui::{
    Dashboard, DashboardBuilder, Layout, LayoutBuilder, Widget, WidgetBuilder,
};
use crate::components::url::BaseUrl;
use crate::components::view::{GenericView, TemplateEngine, TemplateLoader};
use crate::config::{AdminConfig, AppConfig, AttachmentsConfig};
use crate::db::open_db_in_memory;
use crate::registry::ServiceRegistry;
use log::debug;
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::rc::Rc;

/// Well-known registry keys.
pub mod keys {
    pub const CONFIG: &str = "config";
    pub const ADMIN_CONFIG: &str = "admin/config";
    pub const BASE_URL: &str = "base-url";
    pub const DATABASE: &str = "database";
    pub const LOGGER: &str = "logger";
    pub const CACHE: &str = "cache";
    pub const LOCALES_MANAGER: &str = "locales/manager";
    pub const TRANSLATOR: &str = "translator";
    pub const METADATA_LOADER: &str = "metadata/loader";
    pub const SOURCE_FACTORY: &str = "source/factory";
    pub const PROPERTY_FACTORY: &str = "property/factory";
    pub const PROPERTY_DISPLAY_FACTORY: &str = "property/display/factory";
    pub const MODEL_FACTORY: &str = "model/factory";
    pub const COLLECTION_LOADER: &str = "model/collection/loader";
    pub const ACL: &str = "admin/acl";
    pub const AUTHENTICATOR: &str = "admin/authenticator";
    pub const AUTHORIZER: &str = "admin/authorizer";
    pub const LAYOUT_FACTORY: &str = "layout/factory";
    pub const LAYOUT_BUILDER: &str = "layout/builder";
    pub const WIDGET_FACTORY: &str = "widget/factory";
    pub const WIDGET_BUILDER: &str = "widget/builder";
    pub const DASHBOARD_FACTORY: &str = "dashboard/factory";
    pub const DASHBOARD_BUILDER: &str = "dashboard/builder";
    pub const CONSOLE_SYSTEM: &str = "console/system";
    pub const CONSOLE_OUTPUT: &str = "console/output";
    pub const CONSOLE_READER: &str = "console/reader";
    pub const CONSOLE_UTIL: &str = "console/util";
    pub const CONSOLE: &str = "console";
    pub const VIEW_LOADER: &str = "view/loader";
    pub const VIEW_ENGINE: &str = "view/engine";
    pub const VIEW: &str = "view";
    pub const EMAIL_FACTORY: &str = "email/factory";
    pub const ELFINDER_CONFIG: &str = "elfinder/config";
    pub const MENU_BUILDER: &str = "menu/builder";
    pub const MENU_ITEM_BUILDER: &str = "menu/item/builder";
    pub const ATTACHMENTS_CONFIG: &str = "attachments/config";
}

use keys::*;

pub const ADMIN_USER_TYPE: &str = "charcoal/admin/user";
pub const ADMIN_TOKEN_TYPE: &str = "charcoal/admin/user/auth-token";
pub const ADMIN_RESOURCE: &str = "admin";

const METADATA_PATHS: &[&str] = &[
    "metadata",
    "vendor/charcoal/object/metadata",
    "vendor/charcoal/user/metadata",
];
const VIEW_PATHS: &[&str] = &["views"];

/// Registers fixture services into a `ServiceRegistry`.
#[derive(Debug, Clone)]
pub struct ServiceProvider {
    base_path: PathBuf,
}

impl Default for ServiceProvider {
    fn default() -> Self {
        Self::new(".")
    }
}

impl ServiceProvider {
    /// `base_path` becomes `config.base_path`, the root for metadata and
    /// view lookups.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }

    /// config, database, logger, cache.
    pub fn register_base_services(&self, registry: &mut ServiceRegistry) {
        self.register_config(registry);
        self.register_database(registry);
        self.register_logger(registry);
        self.register_cache(registry);
        debug!("event=provider_register module=registry status=ok group=base");
    }

    /// base-url, admin config, authenticator, authorizer.
    pub fn register_admin_services(&self, registry: &mut ServiceRegistry) {
        self.register_base_url(registry);
        self.register_admin_config(registry);
        self.register_authenticator(registry);
        self.register_authorizer(registry);
        debug!("event=provider_register module=registry status=ok group=admin");
    }

    pub fn register_base_url(&self, registry: &mut ServiceRegistry) {
        registry.register(BASE_URL, |_| Ok(BaseUrl::parse("").with_path_as_base()));
    }

    pub fn register_config(&self, registry: &mut ServiceRegistry) {
        let base_path = self.base_path.clone();
        registry.register(CONFIG, move |_| {
            let config = AppConfig::from_value(json!({
                "base_path": base_path.to_string_lossy(),
                "apis": {
                    "google": {
                        "recaptcha": {
                            "public_key": "foobar",
                            "private_key": "bazqux"
                        }
                    }
                }
            }))?;
            Ok(config)
        });
    }

    /// Admin config defaults, overlaid with `config.admin` when present.
    pub fn register_admin_config(&self, registry: &mut ServiceRegistry) {
        self.register_config(registry);

        registry.register(ADMIN_CONFIG, |registry| {
            let config = registry.resolve::<AppConfig>(CONFIG)?;
            let admin = match config.get("admin") {
                Some(section) => AdminConfig::deserialize(section)?,
                None => AdminConfig::default(),
            };
            Ok(admin)
        });
    }

    pub fn register_layout_factory(&self, registry: &mut ServiceRegistry) {
        registry.register(LAYOUT_FACTORY, |_| {
            Ok(GenericFactory::new().with_default(|ctx| Ok(Layout::new(ctx.ident))))
        });
    }

    pub fn register_layout_builder(&self, registry: &mut ServiceRegistry) {
        self.register_layout_factory(registry);

        registry.register(LAYOUT_BUILDER, |registry| {
            Ok(LayoutBuilder::new(
                registry.resolve::<GenericFactory<Layout>>(LAYOUT_FACTORY)?,
            ))
        });
    }

    pub fn register_dashboard_factory(&self, registry: &mut ServiceRegistry) {
        self.register_logger(registry);
        self.register_widget_builder(registry);
        self.register_layout_builder(registry);

        registry.register(DASHBOARD_FACTORY, |registry| {
            let arguments = FactoryArguments::new()
                .with("logger", registry.resolve::<ServiceLogger>(LOGGER)?)
                .with(
                    "widget_builder",
                    registry.resolve::<WidgetBuilder>(WIDGET_BUILDER)?,
                )
                .with(
                    "layout_builder",
                    registry.resolve::<LayoutBuilder>(LAYOUT_BUILDER)?,
                );
            Ok(GenericFactory::new()
                .with_resolver(ResolverOptions::suffix("Dashboard"))
                .with_arguments(arguments)
                .with_default(|ctx| {
                    Ok(Dashboard::new(
                        ctx.ident,
                        ctx.class,
                        ctx.require("widget_builder")?,
                        ctx.require("layout_builder")?,
                    ))
                }))
        });
    }

    pub fn register_dashboard_builder(&self, registry: &mut ServiceRegistry) {
        self.register_dashboard_factory(registry);

        registry.register(DASHBOARD_BUILDER, |registry| {
            Ok(DashboardBuilder::new(
                registry.resolve::<GenericFactory<Dashboard>>(DASHBOARD_FACTORY)?,
            ))
        });
    }

    pub fn register_widget_factory(&self, registry: &mut ServiceRegistry) {
        self.register_logger(registry);

        registry.register(WIDGET_FACTORY, |registry| {
            let arguments = FactoryArguments::new()
                .with("logger", registry.resolve::<ServiceLogger>(LOGGER)?);
            Ok(GenericFactory::new()
                .with_resolver(ResolverOptions::suffix("Widget"))
                .with_arguments(arguments)
                .with_default(|ctx| Ok(Widget::new(ctx.ident, ctx.class))))
        });
    }

    pub fn register_widget_builder(&self, registry: &mut ServiceRegistry) {
        self.register_widget_factory(registry);

        registry.register(WIDGET_BUILDER, |registry| {
            Ok(WidgetBuilder::new(
                registry.resolve::<GenericFactory<Widget>>(WIDGET_FACTORY)?,
            ))
        });
    }

    /// Terminal stand-ins: ANSI enabled, 80 columns, scripted answers.
    pub fn register_console(&self, registry: &mut ServiceRegistry) {
        registry.register(CONSOLE_SYSTEM, |_| Ok(ConsoleSystem::default()));
        registry.register(CONSOLE_OUTPUT, |_| Ok(ConsoleOutput::new()));
        registry.register(CONSOLE_READER, |_| Ok(ConsoleReader::default()));
        registry.register(CONSOLE_UTIL, |registry| {
            Ok(ConsoleUtil::new(
                registry.resolve::<ConsoleSystem>(CONSOLE_SYSTEM)?,
            ))
        });
        registry.register(CONSOLE, |registry| {
            Ok(Console::new(
                registry.resolve::<ConsoleOutput>(CONSOLE_OUTPUT)?,
                registry.resolve::<ConsoleUtil>(CONSOLE_UTIL)?,
                registry.resolve::<ConsoleReader>(CONSOLE_READER)?,
            ))
        });
    }

    /// View loader, engine and facade. Reads `logger` and `config` without
    /// registering them.
    pub fn register_view(&self, registry: &mut ServiceRegistry) {
        registry.register(VIEW_LOADER, |registry| {
            let config = registry.resolve::<AppConfig>(CONFIG)?;
            Ok(TemplateLoader::new(
                registry.resolve::<ServiceLogger>(LOGGER)?,
                config_base_path(&config),
                VIEW_PATHS.iter().map(|path| path.to_string()).collect(),
            ))
        });

        registry.register(VIEW_ENGINE, |registry| {
            Ok(TemplateEngine::new(
                registry.resolve::<ServiceLogger>(LOGGER)?,
                registry.resolve::<TemplateLoader>(VIEW_LOADER)?,
            ))
        });

        registry.register(VIEW, |registry| {
            Ok(GenericView::new(
                registry.resolve::<ServiceLogger>(LOGGER)?,
                registry.resolve::<TemplateEngine>(VIEW_ENGINE)?,
            ))
        });
    }

    /// `locales/manager` with `en` (`en-US`) and the translator over it.
    pub fn register_translator(&self, registry: &mut ServiceRegistry) {
        registry.register(LOCALES_MANAGER, |_| {
            let mut locales = BTreeMap::new();
            locales.insert(
                "en".to_string(),
                LocaleStructure {
                    locale: "en-US".to_string(),
                },
            );
            Ok(LocalesManager::new(locales, None)?)
        });

        registry.register(TRANSLATOR, |registry| {
            Ok(Translator::new(
                registry.resolve::<LocalesManager>(LOCALES_MANAGER)?,
            ))
        });
    }

    pub fn register_logger(&self, registry: &mut ServiceRegistry) {
        registry.register(LOGGER, |_| Ok(ServiceLogger::null()));
    }

    pub fn register_cache(&self, registry: &mut ServiceRegistry) {
        registry.register(CACHE, |_| Ok(CachePool::new()));
    }

    /// In-memory SQLite, migrated.
    pub fn register_database(&self, registry: &mut ServiceRegistry) {
        registry.register(DATABASE, |_| Ok(open_db_in_memory()?));
    }

    /// Uses `config.base_path` when `config` is bound, `.` otherwise.
    pub fn register_metadata_loader(&self, registry: &mut ServiceRegistry) {
        self.register_logger(registry);
        self.register_cache(registry);

        registry.register(METADATA_LOADER, |registry| {
            let base_path = match registry.resolve_optional::<AppConfig>(CONFIG)? {
                Some(config) => config_base_path(&config),
                None => PathBuf::from("."),
            };
            Ok(MetadataLoader::new(
                registry.resolve::<ServiceLogger>(LOGGER)?,
                registry.resolve::<CachePool>(CACHE)?,
                base_path,
                METADATA_PATHS.iter().map(|path| path.to_string()).collect(),
            ))
        });
    }

    pub fn register_source_factory(&self, registry: &mut ServiceRegistry) {
        self.register_logger(registry);
        self.register_database(registry);

        registry.register(SOURCE_FACTORY, |registry| {
            let arguments = FactoryArguments::new()
                .with("logger", registry.resolve::<ServiceLogger>(LOGGER)?)
                .with("pdo", registry.resolve::<Connection>(DATABASE)?);
            Ok(GenericFactory::new()
                .with_arguments(arguments)
                .map("database", |ctx| {
                    Ok(DatabaseSource::new(ctx.ident, ctx.require::<Connection>("pdo")?))
                }))
        });
    }

    pub fn register_property_factory(&self, registry: &mut ServiceRegistry) {
        self.register_translator(registry);
        self.register_database(registry);
        self.register_logger(registry);

        registry.register(PROPERTY_FACTORY, |registry| {
            let arguments = FactoryArguments::new()
                .with("database", registry.resolve::<Connection>(DATABASE)?)
                .with("translator", registry.resolve::<Translator>(TRANSLATOR)?)
                .with("logger", registry.resolve::<ServiceLogger>(LOGGER)?);
            Ok(GenericFactory::new()
                .with_resolver(ResolverOptions {
                    prefix: "Charcoal::Property::".to_string(),
                    suffix: "Property".to_string(),
                })
                .with_arguments(arguments)
                .with_default(|ctx| {
                    let translator = ctx.require::<Translator>("translator")?;
                    Ok(Property {
                        property_type: ctx.ident.to_string(),
                        class: ctx.class.to_string(),
                        label: Some(translator.translate(ctx.ident)),
                    })
                }))
        });
    }

    pub fn register_property_display_factory(&self, registry: &mut ServiceRegistry) {
        self.register_database(registry);
        self.register_logger(registry);

        registry.register(PROPERTY_DISPLAY_FACTORY, |registry| {
            let arguments = FactoryArguments::new()
                .with("logger", registry.resolve::<ServiceLogger>(LOGGER)?);
            Ok(GenericFactory::new()
                .with_resolver(ResolverOptions::suffix("Display"))
                .with_arguments(arguments)
                .with_default(|ctx| {
                    Ok(PropertyDisplay {
                        display_type: ctx.ident.to_string(),
                        class: ctx.class.to_string(),
                    })
                }))
        });
    }

    /// Models carry the metadata loaded for their type.
    pub fn register_model_factory(&self, registry: &mut ServiceRegistry) {
        self.register_logger(registry);
        self.register_translator(registry);
        self.register_metadata_loader(registry);
        self.register_property_factory(registry);
        self.register_source_factory(registry);

        registry.register(MODEL_FACTORY, |registry| {
            let arguments = FactoryArguments::new()
                .with("logger", registry.resolve::<ServiceLogger>(LOGGER)?)
                .with(
                    "metadata_loader",
                    registry.resolve::<MetadataLoader>(METADATA_LOADER)?,
                )
                .with(
                    "property_factory",
                    registry.resolve::<GenericFactory<Property>>(PROPERTY_FACTORY)?,
                )
                .with(
                    "source_factory",
                    registry.resolve::<GenericFactory<DatabaseSource>>(SOURCE_FACTORY)?,
                );
            Ok(GenericFactory::new()
                .with_arguments(arguments)
                .with_default(|ctx| {
                    let loader = ctx.require::<MetadataLoader>("metadata_loader")?;
                    let metadata = loader.load(ctx.ident).map_err(|err| FactoryError::Build {
                        ident: ctx.ident.to_string(),
                        message: err.to_string(),
                    })?;
                    Ok(Model::new(ctx.ident, metadata))
                }))
        });
    }

    pub fn register_acl(&self, registry: &mut ServiceRegistry) {
        registry.register(ACL, |_| Ok(Acl::new()));
    }

    pub fn register_authenticator(&self, registry: &mut ServiceRegistry) {
        self.register_logger(registry);
        self.register_model_factory(registry);

        registry.register(AUTHENTICATOR, |registry| {
            let models = registry.resolve::<GenericFactory<Model>>(MODEL_FACTORY)?;
            Ok(Authenticator::new(AuthenticatorOptions {
                logger: registry.resolve::<ServiceLogger>(LOGGER)?,
                user_type: ADMIN_USER_TYPE.to_string(),
                user_factory: Rc::clone(&models),
                token_type: ADMIN_TOKEN_TYPE.to_string(),
                token_factory: models,
            }))
        });
    }

    pub fn register_authorizer(&self, registry: &mut ServiceRegistry) {
        self.register_logger(registry);
        self.register_acl(registry);

        registry.register(AUTHORIZER, |registry| {
            Ok(Authorizer::new(
                registry.resolve::<ServiceLogger>(LOGGER)?,
                registry.resolve::<Acl>(ACL)?,
                ADMIN_RESOURCE,
            ))
        });
    }

    pub fn register_collection_loader(&self, registry: &mut ServiceRegistry) {
        self.register_logger(registry);
        self.register_model_factory(registry);

        registry.register(COLLECTION_LOADER, |registry| {
            Ok(CollectionLoader::new(
                registry.resolve::<ServiceLogger>(LOGGER)?,
                registry.resolve::<GenericFactory<Model>>(MODEL_FACTORY)?,
            ))
        });
    }

    pub fn register_email_factory(&self, registry: &mut ServiceRegistry) {
        registry.register(EMAIL_FACTORY, |_| {
            Ok(GenericFactory::new().map("email", |_| Ok(Email::default())))
        });
    }

    pub fn register_elfinder_config(&self, registry: &mut ServiceRegistry) {
        registry.register(ELFINDER_CONFIG, |_| Ok(Value::Object(Map::new())));
    }

    /// Binds an explicit container configuration, overriding
    /// `config.attachments` for containers built from this registry.
    pub fn register_attachments_config(
        &self,
        registry: &mut ServiceRegistry,
        config: AttachmentsConfig,
    ) {
        registry.set(ATTACHMENTS_CONFIG, config);
    }

    pub fn register_action_dependencies(&self, registry: &mut ServiceRegistry) {
        self.register_logger(registry);

        self.register_model_factory(registry);
        self.register_translator(registry);

        self.register_admin_config(registry);
        self.register_base_url(registry);

        self.register_authenticator(registry);
        self.register_authorizer(registry);
    }

    /// Same as action dependencies, plus menu builders left unconfigured.
    pub fn register_template_dependencies(&self, registry: &mut ServiceRegistry) {
        self.register_action_dependencies(registry);

        registry.set_placeholder(MENU_BUILDER);
        registry.set_placeholder(MENU_ITEM_BUILDER);
    }

    pub fn register_widget_dependencies(&self, registry: &mut ServiceRegistry) {
        self.register_logger(registry);
        self.register_translator(registry);
        self.register_view(registry);
        self.register_admin_config(registry);
        self.register_base_url(registry);
        self.register_model_factory(registry);

        self.register_authenticator(registry);
        self.register_authorizer(registry);
    }
}

fn config_base_path(config: &AppConfig) -> PathBuf {
    PathBuf::from(config.base_path().unwrap_or("."))
}

#[cfg(test)]
mod tests {
    use super::keys::*;
    use super::ServiceProvider;
    use crate::components::auth::Authenticator;
    use crate::components::console::{Console, ConsoleSystem, ConsoleUtil};
    use crate::components::email::Email;
    use crate::components::factory::GenericFactory;
    use crate::components::model::{CollectionLoader, Model, Property, PropertyDisplay};
    use crate::components::ui::DashboardBuilder;
    use crate::config::{AdminConfig, AppConfig};
    use crate::registry::{RegistryError, ServiceRegistry};
    use serde_json::{json, Value};
    use std::rc::Rc;

    #[test]
    fn registration_constructs_nothing() {
        let mut registry = ServiceRegistry::new();
        ServiceProvider::default().register_base_services(&mut registry);

        for key in [CONFIG, DATABASE, LOGGER, CACHE] {
            assert!(registry.is_configured(key), "{key} should be bound");
            assert!(!registry.is_resolved(key), "{key} should be lazy");
        }
    }

    #[test]
    fn config_carries_base_path_and_recaptcha_keys() {
        let mut registry = ServiceRegistry::new();
        ServiceProvider::new("/srv/app").register_config(&mut registry);

        let config = registry
            .resolve::<AppConfig>(CONFIG)
            .expect("config should resolve");
        assert_eq!(config.base_path(), Some("/srv/app"));
        assert_eq!(
            config.get("apis.google.recaptcha.public_key"),
            Some(&json!("foobar"))
        );
        assert_eq!(
            config.get("apis.google.recaptcha.private_key"),
            Some(&json!("bazqux"))
        );
    }

    #[test]
    fn admin_config_defaults_to_admin_base_path() {
        let mut registry = ServiceRegistry::new();
        ServiceProvider::default().register_admin_config(&mut registry);

        let admin = registry
            .resolve::<AdminConfig>(ADMIN_CONFIG)
            .expect("admin config should resolve");
        assert_eq!(admin.base_path, "admin");
    }

    #[test]
    fn authenticator_uses_admin_types() {
        let mut registry = ServiceRegistry::new();
        ServiceProvider::default().register_authenticator(&mut registry);

        let authenticator = registry
            .resolve::<Authenticator>(AUTHENTICATOR)
            .expect("authenticator should resolve");
        assert_eq!(authenticator.user_type(), "charcoal/admin/user");
        assert_eq!(authenticator.token_type(), "charcoal/admin/user/auth-token");
        assert!(registry.is_resolved(MODEL_FACTORY));
        assert!(registry.is_resolved(LOGGER));
    }

    #[test]
    fn property_factory_resolves_prefixed_class_names() {
        let mut registry = ServiceRegistry::new();
        ServiceProvider::default().register_property_factory(&mut registry);

        let factory = registry
            .resolve::<GenericFactory<Property>>(PROPERTY_FACTORY)
            .expect("property factory should resolve");
        let property = factory.create("string").expect("default builder");
        assert_eq!(property.class, "Charcoal::Property::StringProperty");
        assert_eq!(property.label.as_deref(), Some("string"));
    }

    #[test]
    fn dashboard_builder_shares_widget_builder() {
        let mut registry = ServiceRegistry::new();
        ServiceProvider::default().register_dashboard_builder(&mut registry);

        let builder = registry
            .resolve::<DashboardBuilder>(DASHBOARD_BUILDER)
            .expect("dashboard builder should resolve");
        let dashboard = builder
            .build(&json!({ "type": "admin/home" }))
            .expect("dashboard should build");
        assert_eq!(dashboard.class, "Admin::HomeDashboard");

        let first = registry
            .resolve::<crate::components::ui::WidgetBuilder>(WIDGET_BUILDER)
            .expect("widget builder");
        let second = registry
            .resolve::<crate::components::ui::WidgetBuilder>(WIDGET_BUILDER)
            .expect("widget builder");
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn template_dependencies_leave_menu_builders_unconfigured() {
        let mut registry = ServiceRegistry::new();
        ServiceProvider::default().register_template_dependencies(&mut registry);

        assert!(registry.contains(MENU_BUILDER));
        assert!(registry.is_placeholder(MENU_ITEM_BUILDER));
        let err = registry
            .resolve::<Value>(MENU_BUILDER)
            .expect_err("placeholder must not resolve");
        assert!(matches!(err, RegistryError::Unconfigured(key) if key == MENU_BUILDER));
        assert!(registry.is_configured(AUTHORIZER));
    }

    #[test]
    fn view_without_config_fails_when_resolved() {
        let mut registry = ServiceRegistry::new();
        let provider = ServiceProvider::default();
        provider.register_logger(&mut registry);
        provider.register_view(&mut registry);

        let err = registry
            .resolve::<crate::components::view::GenericView>(VIEW)
            .expect_err("view needs config");
        assert!(matches!(err.root_cause(), RegistryError::NotRegistered(key) if key == CONFIG));
    }

    #[test]
    fn elfinder_config_is_empty_object() {
        let mut registry = ServiceRegistry::new();
        ServiceProvider::default().register_elfinder_config(&mut registry);

        let value = registry
            .resolve::<Value>(ELFINDER_CONFIG)
            .expect("elfinder config should resolve");
        assert_eq!(*value, json!({}));
    }

    #[test]
    fn console_util_shares_console_system() {
        let mut registry = ServiceRegistry::new();
        ServiceProvider::default().register_console(&mut registry);

        let console = registry
            .resolve::<Console>(CONSOLE)
            .expect("console should resolve");
        let util = registry
            .resolve::<ConsoleUtil>(CONSOLE_UTIL)
            .expect("console util should resolve");
        let system = registry
            .resolve::<ConsoleSystem>(CONSOLE_SYSTEM)
            .expect("console system should resolve");

        assert!(Rc::ptr_eq(util.system(), &system));
        assert_eq!(util.width(), 80);
        assert!(util.has_ansi_support());

        console.border('=');
        assert_eq!(console.prompt("Name?"), "line");
        assert_eq!(console.output().lines(), vec!["=".repeat(80), "Name?".to_string()]);
    }

    #[test]
    fn email_factory_creates_blank_email() {
        let mut registry = ServiceRegistry::new();
        ServiceProvider::default().register_email_factory(&mut registry);

        let factory = registry
            .resolve::<GenericFactory<Email>>(EMAIL_FACTORY)
            .expect("email factory should resolve");
        let email = factory.create("email").expect("email is mapped");
        assert_eq!(email, Email::default());
        assert!(!email.is_sendable());

        let email = email.add_to("admin@example.com").subject("   ");
        assert!(!email.is_sendable());
        assert!(email.subject("Attachment added").is_sendable());
    }

    #[test]
    fn collection_loader_shares_model_factory() {
        let mut registry = ServiceRegistry::new();
        ServiceProvider::default().register_collection_loader(&mut registry);

        let loader = registry
            .resolve::<CollectionLoader>(COLLECTION_LOADER)
            .expect("collection loader should resolve");
        let models = registry
            .resolve::<GenericFactory<Model>>(MODEL_FACTORY)
            .expect("model factory should resolve");
        assert!(Rc::ptr_eq(loader.factory(), &models));

        let loaded = loader
            .load(
                "charcoal/admin/user",
                [json!({ "id": 1, "email": "a@example.com" }), json!({ "id": 2 })],
            )
            .expect("object rows load");
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].obj_type, "charcoal/admin/user");
        assert_eq!(loaded[0].get("email"), Some(&json!("a@example.com")));
        assert_eq!(loaded[1].get("id"), Some(&json!(2)));

        assert!(loader
            .load("charcoal/admin/user", [json!([1, 2])])
            .is_err());
    }

    #[test]
    fn property_display_factory_appends_display_suffix() {
        let mut registry = ServiceRegistry::new();
        ServiceProvider::default().register_property_display_factory(&mut registry);

        let factory = registry
            .resolve::<GenericFactory<PropertyDisplay>>(PROPERTY_DISPLAY_FACTORY)
            .expect("property display factory should resolve");
        let display = factory.create("text").expect("default builder");
        assert_eq!(display.display_type, "text");
        assert_eq!(display.class, "TextDisplay");
    }
}
