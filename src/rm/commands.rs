use crate::config::{
    AddUserToRoleArgs, CreateUserArgs, GroupArgs, RoleArgs, RoleListArgs, RunScriptArgs,
    UserTargetArgs,
};
use crate::core::session::VaultSession;
use crate::domain::model::{MessageType, VaultRecord};
use crate::domain::ports::{GatewayRouter, Prompt, VaultApi};
use crate::rm::action::*;
use crate::rm::gateway::{get_response_data, GatewayContext, GatewayResult};
use crate::rm::meta::{get_meta_data, get_meta_info, show_meta_menu, MetaClass};
use crate::rm::types::{RmResponse, RmRole, RmScriptResponse, RmUser};
use crate::utils::display::Painter;
use crate::utils::error::{OpsError, Result};
use serde::Serialize;

/// Remote account management through a PAM gateway. Each command returns
/// the text to print.
pub struct RemoteManager<V: VaultApi, R: GatewayRouter> {
    session: VaultSession<V>,
    router: R,
    prompt: Box<dyn Prompt>,
    painter: Painter,
}

impl<V: VaultApi, R: GatewayRouter> RemoteManager<V, R> {
    pub fn new(api: V, router: R, prompt: Box<dyn Prompt>, painter: Painter) -> Self {
        Self {
            session: VaultSession::new(api),
            router,
            prompt,
            painter,
        }
    }

    pub fn session(&self) -> &VaultSession<V> {
        &self.session
    }

    pub async fn sync(&self) -> Result<()> {
        self.session.sync().await
    }

    async fn context(&self, gateway: &str) -> Result<GatewayContext> {
        GatewayContext::from_gateway(&self.router, &self.session, gateway).await
    }

    async fn meta_record(&self, ctx: &GatewayContext, resource_uid: Option<&str>) -> Result<VaultRecord> {
        match resource_uid {
            None => Ok(ctx.configuration.clone()),
            Some(uid) => self
                .session
                .cache()
                .await
                .record(uid)
                .cloned()
                .ok_or_else(|| OpsError::NotFound {
                    message: format!("Resource record {} was not found.", uid),
                }),
        }
    }

    /// Runs the meta menu when the record type has a meta class.
    fn collect_meta(&self, ctx: &GatewayContext, class: Option<MetaClass>) -> Result<Option<String>> {
        let Some(class) = class else {
            return Ok(None);
        };
        let mut fields = get_meta_info(class);
        show_meta_menu(&mut fields, self.prompt.as_ref(), &self.painter)?;
        get_meta_data(&fields, class, ctx.record_key()).map(Some)
    }

    async fn send<I: Serialize>(
        &self,
        ctx: &GatewayContext,
        action: &'static str,
        inputs: I,
        verb: &str,
    ) -> Result<GatewayResult> {
        let envelope = serde_json::to_value(GatewayAction::new(action, inputs))?;
        tracing::debug!("📤 Sending {} to gateway {}", action, ctx.gateway_uid);
        let response = self
            .router
            .send_action(&envelope, &ctx.gateway_uid, MessageType::General, false)
            .await?;
        get_response_data(response, verb)
    }

    fn decrypt_data<T: for<'de> serde::Deserialize<'de>>(
        ctx: &GatewayContext,
        result: &GatewayResult,
    ) -> Result<T> {
        let data = result.data.as_deref().ok_or_else(|| OpsError::GatewayError {
            message: "The gateway returned no data.".to_string(),
        })?;
        ctx.decrypt_as(data)
    }

    /// A user UID wins over a user name; the name is sent encrypted.
    fn user_selector(ctx: &GatewayContext, args: &UserTargetArgs) -> Result<(Option<String>, Option<String>)> {
        match (&args.user_uid, &args.user) {
            (Some(uid), _) => Ok((Some(uid.clone()), None)),
            (None, Some(user)) => Ok((None, Some(ctx.encrypt_str(user)?))),
            (None, None) => Err(OpsError::usage("Either the --user or --user-uid is required.")),
        }
    }

    pub async fn create_user(&self, args: &CreateUserArgs) -> Result<String> {
        let ctx = self.context(&args.target.gateway).await?;
        let record = self.meta_record(&ctx, args.target.resource_uid.as_deref()).await?;
        let meta = self.collect_meta(&ctx, MetaClass::for_user(&record)?)?;

        let inputs = CreateUserInputs {
            configuration_uid: ctx.configuration_uid().to_string(),
            user: ctx.encrypt_str(&args.user)?,
            password: args.password.clone(),
            resource_uid: args.target.resource_uid.clone(),
            meta,
            database: args.database.clone(),
        };
        let result = self.send(&ctx, ACTION_CREATE_USER, inputs, "create user").await?;
        let user: RmUser = Self::decrypt_data(&ctx, &result)?;

        let p = &self.painter;
        let private_key = if user.private_key.is_some() { "Yes" } else { "No" };
        Ok([
            p.green("User created successfully"),
            String::new(),
            p.field("Id", &user.id),
            p.field("User", &user.name),
            p.field("Distinguished Name", user.dn.as_deref().unwrap_or_default()),
            p.field("Connect Database", user.connect_database.as_deref().unwrap_or_default()),
            p.field("Password", user.password.as_deref().unwrap_or_default()),
            p.field("Private Key", private_key),
        ]
        .join("\n"))
    }

    pub async fn delete_user(&self, args: &UserTargetArgs) -> Result<String> {
        let ctx = self.context(&args.target.gateway).await?;
        let (user_uid, user) = Self::user_selector(&ctx, args)?;

        let inputs = DeleteUserInputs {
            configuration_uid: ctx.configuration_uid().to_string(),
            user,
            resource_uid: args.target.resource_uid.clone(),
            user_uid,
            database: args.database.clone(),
        };
        let result = self.send(&ctx, ACTION_DELETE_USER, inputs, "delete user").await?;
        let response: RmResponse = match result.data {
            Some(_) => Self::decrypt_data(&ctx, &result)?,
            None => RmResponse::default(),
        };

        let mut lines = vec![self.painter.green("User deleted successfully")];
        if !response.notes.is_empty() {
            lines.push(String::new());
            lines.push(self.painter.header("Notes"));
            lines.extend(response.notes.iter().map(|note| format!("* {}", note)));
        }
        Ok(lines.join("\n"))
    }

    pub async fn create_role(&self, args: &RoleArgs) -> Result<String> {
        let ctx = self.context(&args.target.gateway).await?;
        let record = self.meta_record(&ctx, args.target.resource_uid.as_deref()).await?;
        let meta = self.collect_meta(&ctx, MetaClass::for_role(&record)?)?;

        let inputs = CreateRoleInputs {
            configuration_uid: ctx.configuration_uid().to_string(),
            role: args.role.clone(),
            resource_uid: args.target.resource_uid.clone(),
            meta,
            database: args.database.clone(),
        };
        let result = self.send(&ctx, ACTION_CREATE_ROLE, inputs, "create role").await?;
        let role: RmRole = Self::decrypt_data(&ctx, &result)?;

        let p = &self.painter;
        Ok([
            p.green("Role created successfully"),
            String::new(),
            p.field("Id", &role.id),
            p.field("Name", role.name.as_deref().unwrap_or_default()),
        ]
        .join("\n"))
    }

    pub async fn delete_role(&self, args: &RoleArgs) -> Result<String> {
        let ctx = self.context(&args.target.gateway).await?;
        let inputs = DeleteRoleInputs {
            configuration_uid: ctx.configuration_uid().to_string(),
            role: args.role.clone(),
            resource_uid: args.target.resource_uid.clone(),
            meta: None,
            database: args.database.clone(),
        };
        self.send(&ctx, ACTION_DELETE_ROLE, inputs, "delete role").await?;
        Ok(self.painter.green("Role deleted successfully"))
    }

    pub async fn delete_group(&self, args: &GroupArgs) -> Result<String> {
        let ctx = self.context(&args.target.gateway).await?;
        let inputs = DeleteGroupInputs {
            configuration_uid: ctx.configuration_uid().to_string(),
            group: args.group.clone(),
            resource_uid: args.target.resource_uid.clone(),
            meta: None,
            database: args.database.clone(),
        };
        self.send(&ctx, ACTION_DELETE_GROUP, inputs, "delete group").await?;
        Ok(self.painter.green("Group deleted successfully"))
    }

    pub async fn add_user_to_role(&self, args: &AddUserToRoleArgs) -> Result<String> {
        let ctx = self.context(&args.user.target.gateway).await?;
        let (user_uid, user) = Self::user_selector(&ctx, &args.user)?;

        let inputs = AddUserToRoleInputs {
            configuration_uid: ctx.configuration_uid().to_string(),
            resource_uid: args.user.target.resource_uid.clone(),
            user_uid,
            user,
            role_id: args.role.clone(),
            database: args.user.database.clone(),
        };
        self.send(&ctx, ACTION_ADD_USER_TO_ROLE, inputs, "add user to role")
            .await?;
        Ok(self.painter.green("User added to role."))
    }

    pub async fn get_roles(&self, args: &RoleListArgs) -> Result<String> {
        let ctx = self.context(&args.target.gateway).await?;
        let inputs = RoleListInputs {
            configuration_uid: ctx.configuration_uid().to_string(),
            resource_uid: args.target.resource_uid.clone(),
            user_uid: args.user_uid.clone(),
            database: args.database.clone(),
            include_roles: None,
            exclude_roles: None,
            include_users: !args.exclude_users,
        };
        let result = self.send(&ctx, ACTION_ROLE_LIST, inputs, "get roles").await?;
        let roles: Vec<RmRole> = Self::decrypt_data(&ctx, &result)?;

        let p = &self.painter;
        let mut lines = vec![p.header("Groups")];
        for role in &roles {
            lines.push(format!(
                "  * {} ({})",
                p.blue(role.name.as_deref().unwrap_or_default()),
                role.id
            ));
            if !args.exclude_users {
                lines.extend(role.users.iter().map(|u| format!("    + {}", u.name)));
            }
        }
        Ok(lines.join("\n"))
    }

    pub async fn run_script(&self, args: &RunScriptArgs) -> Result<String> {
        let script = tokio::fs::read_to_string(&args.script_file).await?;
        if script.is_empty() {
            return Err(OpsError::usage("The script file is empty."));
        }

        let ctx = self.context(&args.target.gateway).await?;
        let inputs = RunScriptInputs {
            configuration_uid: ctx.configuration_uid().to_string(),
            script_content: ctx.encrypt_str(&script)?,
            resource_uid: args.target.resource_uid.clone(),
            user_uid: args.user_uid.clone(),
            dry_run: args.dry_run,
        };
        let result = self.send(&ctx, ACTION_RUN_SCRIPT, inputs, "run the script").await?;
        let response: RmScriptResponse = Self::decrypt_data(&ctx, &result)?;

        if args.dry_run {
            return Ok(response.script);
        }
        let p = &self.painter;
        let mut lines = vec![
            p.green("Script was run successfully."),
            String::new(),
            p.header("STDOUT"),
            response.stdout.unwrap_or_default(),
        ];
        if let Some(stderr) = response.stderr.filter(|s| !s.trim().is_empty()) {
            lines.push(String::new());
            lines.push(p.header("STDERR"));
            lines.push(stderr);
        }
        Ok(lines.join("\n"))
    }
}
