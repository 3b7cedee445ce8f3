use clap::Args;
use hsbt_base::consts::env;

use crate::{
    cli::{
        Error,
        internal::{ConnectionArgs, ConnectionResolver, with_spinner, write_stdout},
    },
    config::Config,
    connection::ConnectionManager,
    storage_box::DeployMethod,
};

/// Prepares a storage box for key based logins: known hosts entry, key pair
/// and key deployment.
#[derive(Args, Clone)]
pub struct SetupCommand {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[arg(
        long = "password",
        env = env::PASSWORD,
        hide_env_values = true,
        help = "Password of the storage box. Only needed until the key is deployed."
    )]
    pub password: Option<String>,

    #[arg(
        long = "deploy-method",
        value_enum,
        default_value_t = DeployMethod::InstallSshKey,
        help = "How the public key is copied to the storage box."
    )]
    pub deploy_method: DeployMethod,
}

impl SetupCommand {
    pub async fn run(
        self,
        connection_manager: &ConnectionManager,
        config: &Config,
    ) -> Result<(), Error> {
        let Self { connection: ConnectionArgs { identifier }, password, deploy_method } = self;
        let storage_box = ConnectionResolver::from((connection_manager, config))
            .storage_box(identifier)?
            .with_password(password);

        let message = format!("Deploying public key to {}", storage_box.host());
        let deployed = with_spinner(
            &message,
            storage_box.deploy_public_key_if_not_done(deploy_method, config.key_bits),
        )
        .await?;

        let key_path = storage_box.key_manager().private_key_path();
        let state = if deployed { "is now deployed" } else { "was already deployed" };
        write_stdout(&format!(
            "Key {} {state} on {}",
            key_path.display(),
            storage_box.destination()
        ))
        .await
    }
}
