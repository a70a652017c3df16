use std::io::Write;

use anyhow::Context;
use colored::*;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use regex::Regex;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::error::{Error, Result};
use crate::kubectl::Kubectl;
use crate::models::{LogLevel, PodRef};
use crate::session::Session;

#[derive(Clone, Copy, Debug, Default)]
pub struct LogOptions {
    pub follow: bool,
    pub level: Option<LogLevel>,
}

pub async fn run(
    session: &Session,
    options: LogOptions,
    all_pods: bool,
    target: Option<PodRef>,
) -> anyhow::Result<()> {
    let Some(project) = session.preflight().await else {
        return Ok(());
    };
    println!("🔍 Looking for application pods in project: {}", project);

    if all_pods {
        session
            .setup_cluster_if_needed(&project)
            .await
            .context("failed to setup cluster")?;

        println!("🔍 Gathering pod list...");
        let pods = session
            .kubectl
            .application_pods()
            .await
            .context("failed to find application pods")?;

        if pods.is_empty() {
            println!("{}", "❌ No application pods found".red());
            println!("Make sure your applications are deployed and running.");
            return Ok(());
        }

        println!("📋 Viewing logs for {} pod(s):", pods.len());
        for pod in &pods {
            println!(" - {}", pod);
        }
        println!();

        return Ok(stream_many(&session.kubectl, pods, options).await?);
    }

    let pod = session.resolve_pod(&project, target).await?;
    println!("📋 Viewing logs for pod: {}", pod);
    announce(options, false);
    Ok(stream_pod(&session.kubectl, &pod, options, None).await?)
}

fn announce(options: LogOptions, many: bool) {
    if let Some(level) = options.level {
        println!("📋 Filtering logs by level: {}", level);
    }
    let source = if many { " from multiple pods" } else { "" };
    if options.follow {
        println!("🔄 Following logs{} (press Ctrl+C to stop)...", source);
    } else {
        println!("📋 Fetching logs{}...", source);
    }
    println!();
}

/// Colored `[namespace/name]` tag for fan-out output.
fn pod_prefix(pod: &PodRef) -> ColoredString {
    let text = format!("[{}]", pod);
    match pod.name.len() % 4 {
        0 => text.cyan(),
        1 => text.green(),
        2 => text.magenta(),
        _ => text.yellow(),
    }
    .bold()
}

/// Copies log lines from `reader` to `out`, dropping those `matcher` rejects.
/// Bytes that are not UTF-8 are replaced rather than ending the stream.
pub async fn forward_lines<R, W>(
    mut reader: R,
    matcher: Option<&Regex>,
    prefix: Option<&ColoredString>,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);
        if matcher.is_some_and(|re| !re.is_match(line)) {
            continue;
        }
        match prefix {
            Some(prefix) => writeln!(out, "{} {}", prefix, line)?,
            None => writeln!(out, "{}", line)?,
        }
    }
    out.flush()?;
    Ok(())
}

pub async fn stream_pod(
    kubectl: &Kubectl,
    pod: &PodRef,
    options: LogOptions,
    prefix: Option<ColoredString>,
) -> Result<()> {
    let matcher = options.level.map(LogLevel::matcher).transpose()?;
    let args = Kubectl::logs_args(pod, options.follow);
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    let mut child = kubectl.spawn_logs(&args)?;
    if let Some(stdout) = child.stdout.take() {
        forward_lines(
            BufReader::new(stdout),
            matcher.as_ref(),
            prefix.as_ref(),
            &mut std::io::stdout(),
        )
        .await?;
    }
    kubectl.wait_logs(&args, child).await
}

/// Streams every pod concurrently, one task each. Lines from different pods
/// interleave freely. Waits for all of them and returns the earliest failure.
pub async fn stream_many(kubectl: &Kubectl, pods: Vec<PodRef>, options: LogOptions) -> Result<()> {
    announce(options, true);

    let mut tasks: FuturesUnordered<_> = pods
        .into_iter()
        .map(|pod| {
            let kubectl = kubectl.clone();
            tokio::spawn(async move {
                let prefix = pod_prefix(&pod);
                stream_pod(&kubectl, &pod, options, Some(prefix))
                    .await
                    .map_err(|e| Error::PodLogs {
                        pod: pod.to_string(),
                        source: Box::new(e),
                    })
            })
        })
        .collect();

    let mut first_err = None;
    while let Some(res) = tasks.next().await {
        if let Err(e) = res.map_err(Error::from).and_then(|r| r) {
            first_err.get_or_insert(e);
        }
    }
    first_err.map_or(Ok(()), Err)
}
