use crate::{
    admission::Admission,
    metrics::AdmissionMetrics,
    validation::{PortNamePolicy, Validator},
};
use anyhow::{bail, Result};
use clap::Parser;
use prometheus_client::registry::Registry;
use tracing::info;

#[derive(Debug, Parser)]
#[clap(
    name = "gameserver-admission",
    about = "An admission controller for GameServer resources"
)]
pub struct Args {
    #[clap(
        long,
        default_value = "gameserver=info,warn",
        env = "GAMESERVER_ADMISSION_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    #[clap(flatten)]
    server: kubert::ServerArgs,

    #[clap(flatten)]
    admin: kubert::AdminArgs,

    /// Which container ports must be named: `all-declared` or `exposed-only`.
    #[clap(long, default_value = "all-declared")]
    port_name_policy: PortNamePolicy,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            admin,
            client,
            log_level,
            log_format,
            server,
            port_name_policy,
        } = self;

        let mut prom = <Registry>::default();
        let metrics = AdmissionMetrics::register(prom.sub_registry_with_prefix("admission"));
        let rt_metrics = kubert::RuntimeMetrics::register(prom.sub_registry_with_prefix("kube"));

        let runtime = kubert::Runtime::builder()
            .with_log(log_level, log_format)
            .with_metrics(rt_metrics)
            .with_admin(admin.into_builder().with_prometheus(prom))
            .with_client(client)
            .with_server(server)
            .build()
            .await?;

        let admission = Admission::new(Validator::new(port_name_policy), metrics);
        info!(%port_name_policy, "Admitting GameServer resources");
        let runtime = runtime.spawn_server(admission);

        // Block the main thread on the shutdown signal. Once it fires, wait for the background tasks to
        // complete before exiting.
        if runtime.run().await.is_err() {
            bail!("Aborted");
        }

        Ok(())
    }
}
