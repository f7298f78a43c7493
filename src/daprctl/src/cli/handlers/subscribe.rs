use crate::cli::commands::SubscribeArgs;
use crate::config::Config;
use crate::subscribe::{self, parse_metadata, RoutingRules, SubscriptionOptions};
use anyhow::{Context, Result};
use daprctl_common::{success_message, warning_message, Colorize};

/// Turns command line arguments into endpoint options. Bad JSON is rejected here, before any
/// port or socket is claimed.
pub(crate) fn subscription_options(args: SubscribeArgs) -> Result<SubscriptionOptions> {
    let metadata = args
        .metadata
        .as_deref()
        .filter(|text| !text.trim().is_empty())
        .map(parse_metadata)
        .transpose()
        .context("Error parsing metadata as JSON")?
        .unwrap_or_default();

    let routes = args
        .routes
        .as_deref()
        .filter(|text| !text.trim().is_empty())
        .map(RoutingRules::parse)
        .transpose()
        .context("Error parsing routes as JSON")?;

    let socket_dir = args.socket_dir.filter(|dir| !dir.as_os_str().is_empty());

    Ok(SubscriptionOptions {
        app_id: args.app_id,
        pubsub_name: args.pubsub,
        topic: args.topic,
        socket_dir,
        metadata,
        routes,
    })
}

pub async fn subscribe(args: SubscribeArgs, config: &Config) -> Result<()> {
    let options = subscription_options(args)?;

    if options.socket_dir.is_some() {
        if cfg!(windows) {
            anyhow::bail!("The unix-domain-socket option is not supported on Windows");
        }
        warning_message!("Unix domain sockets are currently a preview feature");
    }

    let topic = options.topic.clone();
    subscribe::serve(options, config)
        .await
        .with_context(|| format!("Error subscribing to topic {}", topic))?;

    success_message!("Subscription ended successfully");
    Ok(())
}
