use crate::peer_info::{AudioSettings, MediaSetting, MediaStatus, VideoSettings};

/// Settings of one local stream as advertised to peers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamSettings {
    pub audio: MediaSetting<AudioSettings>,
    pub video: MediaSetting<VideoSettings>,
}

/// What the local user currently publishes.
#[derive(Debug, Clone, Default)]
pub struct LocalMedia {
    user_media: Option<StreamSettings>,
    screenshare: Option<StreamSettings>,
    audio_muted: bool,
    video_muted: bool,
}

impl LocalMedia {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_user_media(&mut self, settings: Option<StreamSettings>) {
        self.user_media = settings;
    }

    pub fn set_screenshare(&mut self, settings: Option<StreamSettings>) {
        self.screenshare = settings;
    }

    /// Ends the screen share; camera and microphone settings apply again.
    pub fn stop_screenshare(&mut self) {
        self.screenshare = None;
    }

    /// Screen share wins over camera and microphone.
    pub fn active_settings(&self) -> Option<&StreamSettings> {
        self.screenshare.as_ref().or(self.user_media.as_ref())
    }

    pub fn is_sharing_screen(&self) -> bool {
        self.screenshare.is_some()
    }

    pub fn media_status(&self) -> MediaStatus {
        MediaStatus {
            audio_muted: self.audio_muted,
            video_muted: self.video_muted,
        }
    }

    pub fn set_audio_muted(&mut self, muted: bool) -> bool {
        let changed = self.audio_muted != muted;
        self.audio_muted = muted;
        changed
    }

    pub fn set_video_muted(&mut self, muted: bool) -> bool {
        let changed = self.video_muted != muted;
        self.video_muted = muted;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> StreamSettings {
        StreamSettings {
            audio: MediaSetting::Detailed(AudioSettings::default()),
            video: MediaSetting::Detailed(VideoSettings {
                frame_rate: Some(30.0),
                ..Default::default()
            }),
        }
    }

    fn screen() -> StreamSettings {
        StreamSettings {
            audio: MediaSetting::Flag(false),
            video: MediaSetting::Detailed(VideoSettings {
                screenshare: true,
                ..Default::default()
            }),
        }
    }

    #[test]
    fn screenshare_takes_precedence() {
        let mut media = LocalMedia::new();
        assert!(media.active_settings().is_none());

        media.set_user_media(Some(camera()));
        assert_eq!(media.active_settings(), Some(&camera()));

        media.set_screenshare(Some(screen()));
        assert_eq!(media.active_settings(), Some(&screen()));

        media.stop_screenshare();
        assert!(!media.is_sharing_screen());
        assert_eq!(media.active_settings(), Some(&camera()));
    }

    #[test]
    fn mute_setters_report_changes() {
        let mut media = LocalMedia::new();
        assert!(media.set_audio_muted(true));
        assert!(!media.set_audio_muted(true));
        assert!(!media.set_video_muted(false));
        assert_eq!(
            media.media_status(),
            MediaStatus {
                audio_muted: true,
                video_muted: false
            }
        );
    }
}
