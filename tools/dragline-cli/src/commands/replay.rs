//! Replay a recorded pointer trace through the gesture controller.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use dragline_common::clock::{Clock, MonotonicClock};
use dragline_common::config::{DragConfig, DraglineConfig, ThresholdMetric};
use dragline_controller::pump::EventPump;
use dragline_controller::source::{load_trace, ScriptedSource};
use dragline_controller::writer::NotificationWriter;
use dragline_controller::{EventTarget, GestureController, InMemoryDocument, TraceReplayer};
use dragline_gesture_model::notification::{NotificationLogHeader, RecordedNotification};
use dragline_gesture_model::trace::{Trace, TraceTarget};

pub struct ReplayOptions {
    pub output: Option<PathBuf>,
    pub delay: Option<u64>,
    pub threshold: Option<f64>,
    pub metric: Option<String>,
    pub live: bool,
    pub json: bool,
}

pub async fn run(
    trace_path: PathBuf,
    config: &DraglineConfig,
    options: ReplayOptions,
) -> anyhow::Result<()> {
    let base = resolve_drag_config(config.drag, &options)?;
    let trace = load_trace(&trace_path)
        .map_err(|e| anyhow::anyhow!("Failed to load trace: {e}"))?;

    if !options.json {
        println!("Replaying trace: {}", trace_path.display());
        println!(
            "  Events: {} over {}ms",
            trace.events.len(),
            trace.duration_ms()
        );
        println!(
            "  Defaults: delay {}ms, threshold {} ({:?})",
            base.delay_ms, base.detach_threshold, base.threshold_metric
        );
        for (index, surface) in trace.header.surfaces.iter().enumerate() {
            let resolved = surface.resolve(base);
            println!(
                "  Surface {index}: {} (delay {}ms, threshold {})",
                surface.subject, resolved.delay_ms, resolved.detach_threshold
            );
        }
        println!();
    }

    let notifications = if options.live {
        let (notifications, stats) = replay_live(&trace, base).await?;
        if options.json {
            println!("{}", serde_json::to_string_pretty(&notifications)?);
        } else {
            println!(
                "Live replay: {} events, {} timer(s) fired",
                stats.events, stats.timers_fired
            );
        }
        notifications
    } else {
        let source = ScriptedSource::from_trace(trace_path.display().to_string(), &trace);
        let mut replayer = TraceReplayer::new(&trace.header, base, Box::new(source));
        let summary = replayer
            .run()
            .map_err(|e| anyhow::anyhow!("Replay failed: {e}"))?;

        if options.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            println!(
                "Replay: {} events, {} touch move(s) prevented, final phase {:?}",
                summary.events, summary.prevented_defaults, summary.final_phase
            );
        }
        summary.notifications
    };

    if !options.json {
        println!();
        if notifications.is_empty() {
            println!("No notifications.");
        } else {
            println!("Notifications:");
            for notification in &notifications {
                println!("  {notification}");
            }
        }
    }

    if let Some(output) = options.output {
        let header = NotificationLogHeader::new(trace_path.display().to_string());
        let mut writer = NotificationWriter::new(output, &header)?;
        writer.write_all(&notifications)?;
        writer.flush()?;
        if !options.json {
            println!(
                "\nWrote {} notification(s) to {}",
                writer.written(),
                writer.path().display()
            );
        }
    }

    Ok(())
}

fn resolve_drag_config(base: DragConfig, options: &ReplayOptions) -> anyhow::Result<DragConfig> {
    let mut config = base;
    if let Some(delay) = options.delay {
        config = config.with_delay_ms(delay);
    }
    if let Some(threshold) = options.threshold {
        if !threshold.is_finite() || threshold < 0.0 {
            anyhow::bail!("Threshold must be a non-negative number, got {threshold}");
        }
        config = config.with_detach_threshold(threshold);
    }
    if let Some(name) = options.metric.as_deref() {
        let metric = ThresholdMetric::from_name(name).ok_or_else(|| {
            anyhow::anyhow!("Unknown metric '{name}' (expected manhattan, signed-sum or euclidean)")
        })?;
        config = config.with_metric(metric);
    }
    Ok(config)
}

/// Feed the trace through the async pump, sleeping until each event's time.
async fn replay_live(
    trace: &Trace,
    base: DragConfig,
) -> anyhow::Result<(Vec<RecordedNotification>, dragline_controller::pump::PumpStats)> {
    let clock = MonotonicClock::start();
    let mut controller: GestureController<String> =
        GestureController::new(Box::new(InMemoryDocument::new()), Box::new(clock.clone()));
    controller.init();

    let surfaces: Vec<_> = trace
        .header
        .surfaces
        .iter()
        .map(|surface| controller.attach(surface.subject.clone(), surface.resolve(base)))
        .collect();

    let recorded = Rc::new(RefCell::new(Vec::new()));
    {
        let recorded = recorded.clone();
        controller.subscribe(move |event| {
            let notification = RecordedNotification::capture(clock.now_ms(), event);
            tracing::debug!(%notification, "Notification");
            recorded.borrow_mut().push(notification);
        });
    }

    let mut targeted = Vec::with_capacity(trace.events.len());
    for timed in &trace.events {
        let target = match timed.target {
            TraceTarget::Document => EventTarget::Document,
            TraceTarget::Surface(index) => surfaces
                .get(index)
                .copied()
                .map(EventTarget::Surface)
                .ok_or_else(|| anyhow::anyhow!("Event targets unknown surface {index}"))?,
        };
        targeted.push((timed.timestamp_ms, target, timed.to_event()));
    }

    let settle_ms = trace
        .header
        .surfaces
        .iter()
        .map(|surface| surface.resolve(base).delay_ms)
        .max()
        .unwrap_or(base.delay_ms);

    let (mut pump, tx) = EventPump::new(controller);
    let start = tokio::time::Instant::now();
    let feed = async move {
        for (t, target, event) in targeted {
            tokio::time::sleep_until(start + std::time::Duration::from_millis(t)).await;
            tx.send(target, event)?;
        }
        // Let a trailing delay timer fire before the channel closes.
        tokio::time::sleep(std::time::Duration::from_millis(settle_ms)).await;
        Ok::<(), dragline_common::error::DraglineError>(())
    };

    let (stats, fed) = tokio::join!(pump.run(), feed);
    fed?;

    let notifications = recorded.borrow().clone();
    Ok((notifications, stats))
}
