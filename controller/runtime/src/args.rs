use crate::{
    index,
    k8s::{self, annotations},
};
use anyhow::{bail, Result};
use clap::Parser;
use futures::prelude::*;
use kube::runtime::watcher;
use prometheus_client::registry::Registry;
use tokio::sync::mpsc;
use tracing::{info, info_span, Instrument};

#[derive(Debug, Parser)]
#[clap(name = "appinst", about = "An application instance resource controller")]
pub struct Args {
    #[clap(
        long,
        default_value = "appinst=info,warn",
        env = "APPINST_CONTROLLER_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    #[clap(flatten)]
    admin: kubert::AdminArgs,

    /// The application instance annotation that names its application service.
    #[clap(long, default_value = annotations::APPLICATION_SERVICE)]
    service_annotation: String,

    /// The service label that names its application instance.
    #[clap(long, default_value = annotations::APPLICATION_INSTANCE_NAME)]
    instance_label: String,

    /// Restricts watches to a single namespace. All namespaces are watched when unset.
    #[clap(long)]
    watch_namespace: Option<String>,
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
            service_annotation,
            instance_label,
            watch_namespace,
        } = self;

        let mut prom = <Registry>::default();
        let cache_metrics = index::CacheMetrics::register(prom.sub_registry_with_prefix("k8s"));
        let rt_metrics = kubert::RuntimeMetrics::register(prom.sub_registry_with_prefix("kube"));

        let mut runtime = kubert::Runtime::builder()
            .with_log(log_level, log_format)
            .with_metrics(rt_metrics)
            .with_admin(admin.into_builder().with_prometheus(prom))
            .with_client(client)
            .build()
            .await?;

        // Services that are waiting on an application instance are requeued on this channel once
        // the instance is known. The cache never processes services itself.
        let (requeue_tx, requeue_rx) = mpsc::unbounded_channel();
        let cache =
            index::ApplicationInstanceCache::shared(service_annotation, requeue_tx, cache_metrics);
        let services = index::ServiceIndex::shared(cache.clone(), instance_label);

        // Spawn resource watches.

        let instances = match watch_namespace.as_deref() {
            Some(ns) => runtime
                .watch_namespaced::<k8s::ApplicationInstance>(ns.to_string(), watcher::Config::default())
                .boxed(),
            None => runtime
                .watch_all::<k8s::ApplicationInstance>(watcher::Config::default())
                .boxed(),
        };
        tokio::spawn(
            kubert::index::namespaced(cache, instances)
                .instrument(info_span!("applicationinstances")),
        );

        let service_watch = match watch_namespace.as_deref() {
            Some(ns) => runtime
                .watch_namespaced::<k8s::Service>(ns.to_string(), watcher::Config::default())
                .boxed(),
            None => runtime
                .watch_all::<k8s::Service>(watcher::Config::default())
                .boxed(),
        };
        tokio::spawn(
            kubert::index::namespaced(services.clone(), service_watch)
                .instrument(info_span!("services")),
        );

        // Reprocess requeued services until the runtime begins shutting down.
        let drain = runtime.shutdown_handle();
        tokio::spawn(
            async move {
                tokio::select! {
                    _ = index::requeue_services(services, requeue_rx) => {}
                    release = drain.signaled() => {
                        info!("Stopping service requeues");
                        drop(release);
                    }
                }
            }
            .instrument(info_span!("requeue")),
        );

        // Block the main thread on the shutdown signal. Once it fires, wait for the background tasks to
        // complete before exiting.
        if runtime.run().await.is_err() {
            bail!("Aborted");
        }

        Ok(())
    }
}
