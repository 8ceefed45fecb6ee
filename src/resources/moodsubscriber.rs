//! ECS resource that owns the external command thread.
//!
//! Use [`setup_mood_subscriber`] once during initialization, after the
//! player exists, and [`shutdown_mood_subscriber`] during teardown. The UDP
//! thread is stopped and joined; the stdin thread may be blocked in a read, so
//! it is only flagged and left detached.

use std::net::UdpSocket;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use bevy_ecs::prelude::*;
use log::{debug, info};

use crate::error::ConfigurationError;
use crate::resources::faceconfig::{CommandSourceKind, FaceConfig};
use crate::resources::moodqueue::MoodQueue;
use crate::systems::moodsubscriber::{MoodSubscriber, line_subscriber_loop, udp_subscriber_thread};

/// Read timeout of the UDP socket, bounding how long shutdown waits.
const UDP_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Handle to the running command thread.
#[derive(Resource)]
pub struct MoodSubscriberBridge {
    /// Asks the thread to stop at its next poll.
    pub stop: Arc<AtomicBool>,
    /// Join handle for the background thread.
    pub handle: JoinHandle<()>,
    /// Which transport the thread serves.
    pub kind: CommandSourceKind,
}

/// Start the command thread selected by the [`FaceConfig`] resource.
///
/// Requests go into `queue`; `initial_mood` seeds the repeat filter chosen by
/// [`FaceConfig::effective_dedup`]. With [`CommandSourceKind::None`] nothing
/// is started.
pub fn setup_mood_subscriber(
    world: &mut World,
    queue: MoodQueue,
    initial_mood: &str,
) -> Result<(), ConfigurationError> {
    let config = world.resource::<FaceConfig>().clone();
    let stop = Arc::new(AtomicBool::new(false));
    let subscriber = MoodSubscriber::new(queue, initial_mood, config.effective_dedup());

    let handle = match config.command_source {
        CommandSourceKind::None => {
            info!("[commands] external mood commands disabled");
            return Ok(());
        }
        CommandSourceKind::Udp => {
            let bind_error = |source| ConfigurationError::CommandBind {
                addr: config.bind,
                source,
            };
            let socket = UdpSocket::bind(config.bind).map_err(bind_error)?;
            socket
                .set_read_timeout(Some(UDP_POLL_INTERVAL))
                .map_err(bind_error)?;
            let channel = config.channel.clone();
            let thread_stop = stop.clone();
            std::thread::spawn(move || {
                udp_subscriber_thread(socket, channel, subscriber, thread_stop)
            })
        }
        CommandSourceKind::Stdin => {
            info!("[commands] reading mood commands from stdin");
            let thread_stop = stop.clone();
            std::thread::spawn(move || {
                line_subscriber_loop(std::io::stdin().lock(), subscriber, thread_stop)
            })
        }
    };

    world.insert_resource(MoodSubscriberBridge {
        stop,
        handle,
        kind: config.command_source,
    });
    Ok(())
}

/// Stop the command thread, if any.
pub fn shutdown_mood_subscriber(world: &mut World) {
    let Some(bridge) = world.remove_resource::<MoodSubscriberBridge>() else {
        return;
    };
    bridge.stop.store(true, Ordering::Relaxed);
    match bridge.kind {
        CommandSourceKind::Udp => {
            let _ = bridge.handle.join();
        }
        _ => debug!("[commands] leaving {:?} subscriber detached", bridge.kind),
    }
}
