/// Who asked for a scene switch. Used to avoid echoing a companion viewer's
/// own request back to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwitchOrigin {
    Startup,
    Hotspot,
    Companion,
}

/// Notifications for the host and for the non-immersive companion viewer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TourEvent {
    SceneChanged { scene: String, origin: SwitchOrigin },
    SessionEnded { toast: Option<String> },
}

impl TourEvent {
    /// Scene id the companion viewer should follow, if this event is one it
    /// did not cause itself.
    pub fn companion_scene(&self) -> Option<&str> {
        match self {
            TourEvent::SceneChanged { scene, origin } if *origin != SwitchOrigin::Companion => {
                Some(scene)
            }
            _ => None,
        }
    }
}

/// Drops the companion viewer's echo of a scene change it was just told about.
///
/// Only the batch of requests drained right after the notification can hold the
/// echo; later requests for the same scene are genuine and pass through.
#[derive(Debug, Default)]
pub struct EchoFilter {
    sent: Option<String>,
}

impl EchoFilter {
    pub fn note_sent(&mut self, scene: &str) {
        self.sent = Some(scene.to_string());
    }

    /// Requests from the companion that should reach the session.
    pub fn admit(&mut self, requests: Vec<String>) -> Vec<String> {
        let Some(sent) = self.sent.take() else {
            return requests;
        };
        let mut echo = requests.iter().position(|id| *id == sent);
        requests
            .into_iter()
            .enumerate()
            .filter(|(i, _)| {
                if echo == Some(*i) {
                    echo = None;
                    log::debug!("[companion] ignoring echo of '{}'", sent);
                    return false;
                }
                true
            })
            .map(|(_, id)| id)
            .collect()
    }
}
