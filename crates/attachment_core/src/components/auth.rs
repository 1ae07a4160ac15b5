//! Authenticator and authorizer stand-ins for the admin module.

use crate::components::acl::Acl;
use crate::components::factory::{FactoryResult, GenericFactory};
use crate::components::logger::ServiceLogger;
use crate::components::model::Model;
use serde_json::Value;
use std::rc::Rc;

/// Constructor options for `Authenticator`.
pub struct AuthenticatorOptions {
    pub logger: Rc<ServiceLogger>,
    pub user_type: String,
    pub user_factory: Rc<GenericFactory<Model>>,
    pub token_type: String,
    pub token_factory: Rc<GenericFactory<Model>>,
}

/// Admin user and auth-token model source.
#[derive(Debug)]
pub struct Authenticator {
    logger: Rc<ServiceLogger>,
    user_type: String,
    user_factory: Rc<GenericFactory<Model>>,
    token_type: String,
    token_factory: Rc<GenericFactory<Model>>,
}

impl Authenticator {
    pub fn new(options: AuthenticatorOptions) -> Self {
        Self {
            logger: options.logger,
            user_type: options.user_type,
            user_factory: options.user_factory,
            token_type: options.token_type,
            token_factory: options.token_factory,
        }
    }

    pub fn user_type(&self) -> &str {
        &self.user_type
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    pub fn user_factory(&self) -> &Rc<GenericFactory<Model>> {
        &self.user_factory
    }

    pub fn create_user(&self) -> FactoryResult<Model> {
        self.create(&self.user_factory, &self.user_type)
    }

    pub fn create_token(&self) -> FactoryResult<Model> {
        self.create(&self.token_factory, &self.token_type)
    }

    fn create(&self, factory: &GenericFactory<Model>, obj_type: &str) -> FactoryResult<Model> {
        let model = factory.create(obj_type)?;
        self.logger.debug(&format!(
            "event=auth_model_create module=components status=ok obj_type={obj_type}"
        ));
        Ok(model)
    }
}

/// Permission checker scoped to one ACL resource.
#[derive(Debug)]
pub struct Authorizer {
    logger: Rc<ServiceLogger>,
    acl: Rc<Acl>,
    resource: String,
}

impl Authorizer {
    pub fn new(logger: Rc<ServiceLogger>, acl: Rc<Acl>, resource: impl Into<String>) -> Self {
        Self {
            logger,
            acl,
            resource: resource.into(),
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn acl(&self) -> &Acl {
        &self.acl
    }

    pub fn is_allowed(&self, role: &str, privilege: &str) -> bool {
        self.acl.is_allowed(role, &self.resource, privilege)
    }

    /// A user is allowed when any of its `roles` grants every privilege.
    pub fn is_user_allowed(&self, user: &Model, privileges: &[&str]) -> bool {
        let Some(roles) = user.get("roles").and_then(Value::as_array) else {
            self.logger
                .debug("event=authorize module=components status=rejected reason=no_roles");
            return false;
        };
        roles.iter().filter_map(Value::as_str).any(|role| {
            privileges
                .iter()
                .all(|privilege| self.is_allowed(role, privilege))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Authenticator, AuthenticatorOptions, Authorizer};
    use crate::components::acl::Acl;
    use crate::components::factory::GenericFactory;
    use crate::components::logger::ServiceLogger;
    use crate::components::model::Model;
    use serde_json::json;
    use std::rc::Rc;

    fn authenticator() -> Authenticator {
        let factory = Rc::new(
            GenericFactory::new().with_default(|ctx| Ok(Model::new(ctx.ident, json!({})))),
        );
        Authenticator::new(AuthenticatorOptions {
            logger: Rc::new(ServiceLogger::null()),
            user_type: "charcoal/admin/user".to_string(),
            user_factory: Rc::clone(&factory),
            token_type: "charcoal/admin/user/auth-token".to_string(),
            token_factory: factory,
        })
    }

    #[test]
    fn creates_user_and_token_models_of_bound_types() {
        let auth = authenticator();

        let user = auth.create_user().expect("user model");
        let token = auth.create_token().expect("token model");
        assert_eq!(user.obj_type, "charcoal/admin/user");
        assert_eq!(token.obj_type, "charcoal/admin/user/auth-token");
    }

    #[test]
    fn authorizes_users_by_roles() {
        let acl = Rc::new(Acl::new());
        acl.allow("editor", Some("admin"), Some("edit"));
        let authorizer = Authorizer::new(Rc::new(ServiceLogger::null()), acl, "admin");

        let mut user = Model::new("charcoal/admin/user", json!({}));
        assert!(!authorizer.is_user_allowed(&user, &["edit"]));

        user.set("roles", json!(["guest", "editor"]));
        assert!(authorizer.is_user_allowed(&user, &["edit"]));
        assert!(!authorizer.is_user_allowed(&user, &["edit", "delete"]));
    }
}
