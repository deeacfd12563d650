//! Voice-note capture lifecycle: `Idle -> Recording -> Idle -> Playing -> Idle`.
//!
//! The audio device is an external collaborator behind [`AudioBackend`].
//! Every listener registered on entering `Recording` or `Playing` is removed
//! on every exit path: normal stop, device error, policy rejection, or the
//! recorder being dropped mid-session.

use crate::attachment::{check_attachment, AttachmentContext, AttachmentRef};
use crate::error::CoreError;

pub type ListenerId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
    Playing,
}

impl RecorderState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Playing => "playing",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },

    #[error("No recorded voice note to {0}")]
    NoClip(&'static str),

    #[error("Audio device error: {0}")]
    Device(String),

    #[error(transparent)]
    Policy(#[from] CoreError),
}

/// Platform recorder/player.
pub trait AudioBackend {
    fn add_listener(&mut self) -> ListenerId;
    fn remove_listener(&mut self, listener: ListenerId);
    fn start_recording(&mut self) -> Result<(), AudioError>;
    /// Stop and hand back the captured clip.
    fn stop_recording(&mut self) -> Result<AttachmentRef, AudioError>;
    fn start_playback(&mut self, clip: &AttachmentRef) -> Result<(), AudioError>;
    fn stop_playback(&mut self) -> Result<(), AudioError>;
}

pub struct VoiceNoteRecorder<B: AudioBackend> {
    backend: B,
    state: RecorderState,
    listener: Option<ListenerId>,
    clip: Option<AttachmentRef>,
}

impl<B: AudioBackend> VoiceNoteRecorder<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: RecorderState::Idle,
            listener: None,
            clip: None,
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    /// The accepted clip, if a recording has been kept.
    pub fn clip(&self) -> Option<&AttachmentRef> {
        self.clip.as_ref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn require(&self, state: RecorderState, action: &'static str) -> Result<(), AudioError> {
        if self.state == state {
            Ok(())
        } else {
            Err(AudioError::InvalidTransition {
                state: self.state.as_str(),
                action,
            })
        }
    }

    fn release(&mut self) {
        if let Some(listener) = self.listener.take() {
            self.backend.remove_listener(listener);
        }
        self.state = RecorderState::Idle;
    }

    /// Start a fresh recording, replacing any kept clip.
    pub fn start_recording(&mut self) -> Result<(), AudioError> {
        self.require(RecorderState::Idle, "start recording")?;
        self.listener = Some(self.backend.add_listener());
        if let Err(e) = self.backend.start_recording() {
            self.release();
            return Err(e);
        }
        self.clip = None;
        self.state = RecorderState::Recording;
        Ok(())
    }

    /// Stop recording and keep the clip if the voice-note policy accepts it.
    pub fn stop_recording(&mut self) -> Result<AttachmentRef, AudioError> {
        self.require(RecorderState::Recording, "stop recording")?;
        let result = self.backend.stop_recording();
        self.release();

        let clip = result?;
        check_attachment(&clip, AttachmentContext::VoiceNote)?;
        self.clip = Some(clip.clone());
        Ok(clip)
    }

    pub fn start_playback(&mut self) -> Result<(), AudioError> {
        self.require(RecorderState::Idle, "start playback")?;
        let clip = self.clip.clone().ok_or(AudioError::NoClip("play"))?;
        self.listener = Some(self.backend.add_listener());
        if let Err(e) = self.backend.start_playback(&clip) {
            self.release();
            return Err(e);
        }
        self.state = RecorderState::Playing;
        Ok(())
    }

    /// Stop playback early or acknowledge that it finished.
    pub fn stop_playback(&mut self) -> Result<(), AudioError> {
        self.require(RecorderState::Playing, "stop playback")?;
        let result = self.backend.stop_playback();
        self.release();
        result
    }

    /// Drop the kept clip.
    pub fn discard(&mut self) -> Result<(), AudioError> {
        self.require(RecorderState::Idle, "discard")?;
        self.clip.take().map(|_| ()).ok_or(AudioError::NoClip("discard"))
    }

    /// Hand the kept clip to a submission, leaving the recorder empty.
    pub fn take_clip(&mut self) -> Option<AttachmentRef> {
        self.clip.take()
    }
}

impl<B: AudioBackend> Drop for VoiceNoteRecorder<B> {
    fn drop(&mut self) {
        let outcome = match self.state {
            RecorderState::Recording => self.backend.stop_recording().map(|_| ()),
            RecorderState::Playing => self.backend.stop_playback(),
            RecorderState::Idle => Ok(()),
        };
        if let Err(e) = outcome {
            tracing::warn!(error = %e, "Audio device failed to stop on drop");
        }
        self.release();
    }
}
