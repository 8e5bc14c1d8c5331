//! Audio device capture, media playback and stream management.
//!
//! The cpal callbacks mix down to mono and hand fixed-size blocks to the
//! render thread through a bounded channel.

use anyhow::{anyhow, bail, Context};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use orbit_viz_core::{AudioSource, Transport, BLOCK_SIZE};
use std::time::Duration;

use super::media::{MediaPlayer, MediaTrack};

/// Blocks waiting for the render thread; older audio is dropped beyond this
const BLOCK_QUEUE: usize = 32;

/// Collects mono samples into `BLOCK_SIZE` blocks for the analyzer.
pub struct BlockAssembler {
    block: Vec<f32>,
    sender: Sender<Vec<f32>>,
    dropped: u64,
}

impl BlockAssembler {
    pub fn new(sender: Sender<Vec<f32>>) -> Self {
        Self {
            block: Vec::with_capacity(BLOCK_SIZE),
            sender,
            dropped: 0,
        }
    }

    pub fn push(&mut self, sample: f32) {
        self.block.push(sample);
        if self.block.len() < BLOCK_SIZE {
            return;
        }

        let block = std::mem::replace(&mut self.block, Vec::with_capacity(BLOCK_SIZE));
        match self.sender.try_send(block) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.dropped += 1;
                if self.dropped.is_power_of_two() {
                    log::debug!("Render thread behind, {} audio blocks dropped", self.dropped);
                }
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }

    pub fn push_frames(&mut self, data: &[f32], channels: usize) {
        for frame in data.chunks(channels) {
            self.push(frame.iter().sum::<f32>() / channels as f32);
        }
    }
}

pub struct SourcePipe {
    source: AudioSource,
    blocks: Receiver<Vec<f32>>,
    stream: Stream,
    transport: Transport,
}

impl SourcePipe {
    /// Whether the host can do audio at all. Without it the visualization
    /// runs on the fallback signal alone.
    pub fn enabled() -> bool {
        let host = cpal::default_host();
        host.default_input_device().is_some() || host.default_output_device().is_some()
    }

    /// Builds the stream for `source`. It stays paused until [`play`](Self::play).
    pub fn open(source: AudioSource, muted: bool, device_timeout: Duration) -> anyhow::Result<Self> {
        let (sender, blocks) = crossbeam_channel::bounded(BLOCK_QUEUE);
        let assembler = BlockAssembler::new(sender);

        let stream = match &source {
            AudioSource::Device(name) => {
                let device = Self::find_input_device(name)?;
                Self::build_capture_stream(&device, device_timeout, assembler)?
            }
            AudioSource::Media(path) => {
                let track = MediaTrack::load(path)?;
                log::info!(
                    "Loaded {:?}: {:.1}s at {} Hz",
                    path,
                    track.duration_secs(),
                    track.sample_rate()
                );
                Self::build_playback_stream(track, muted, device_timeout, assembler)?
            }
        };

        if let Err(e) = stream.pause() {
            log::debug!("Stream could not be paused before playback: {}", e);
        }
        log::info!("Opened source: {}", source);

        Ok(Self {
            source,
            blocks,
            stream,
            transport: Transport::Paused,
        })
    }

    pub fn list_devices() {
        let host = cpal::default_host();
        let default_input = host.default_input_device().and_then(|d| d.name().ok());

        println!("\n=== Capture Devices ===");
        if let Ok(inputs) = host.input_devices() {
            for (idx, device) in inputs.enumerate() {
                if let Ok(name) = device.name() {
                    let marker = if default_input.as_deref() == Some(name.as_str()) {
                        " (default)"
                    } else {
                        ""
                    };
                    println!("  [{}] {}{}", idx, name, marker);
                }
            }
        }
        println!("Pass a name with --source, or a .wav file for playback\n");
    }

    pub fn source(&self) -> &AudioSource {
        &self.source
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    /// Starts the stream. Returns true on a paused-to-playing transition.
    pub fn play(&mut self) -> bool {
        if self.transport.is_playing() {
            return false;
        }
        match self.stream.play() {
            Ok(()) => {
                self.transport = Transport::Playing;
                true
            }
            Err(e) => {
                log::error!("Failed to play stream: {}", e);
                false
            }
        }
    }

    pub fn pause(&mut self) {
        if !self.transport.is_playing() {
            return;
        }
        if let Err(e) = self.stream.pause() {
            log::warn!("Failed to pause stream: {}", e);
        }
        self.transport = Transport::Paused;
    }

    /// Blocks delivered since the last call
    pub fn drain(&self) -> impl Iterator<Item = Vec<f32>> + '_ {
        self.blocks.try_iter()
    }

    fn find_input_device(name: &str) -> anyhow::Result<Device> {
        let host = cpal::default_host();
        if name == "default" {
            return host
                .default_input_device()
                .ok_or_else(|| anyhow!("No default capture device"));
        }

        let mut inputs = host
            .input_devices()
            .context("Failed to enumerate capture devices")?;
        inputs
            .find(|d| d.name().map(|n| n == name).unwrap_or(false))
            .ok_or_else(|| anyhow!("Capture device '{}' not found (see --list-devices)", name))
    }

    /// Get device config with timeout (the config call often hangs on bad devices)
    fn get_config_with_timeout(
        device: &Device,
        is_input: bool,
        timeout: Duration,
    ) -> anyhow::Result<StreamConfig> {
        let device_clone = device.clone();
        let (tx, rx) = std::sync::mpsc::channel();

        std::thread::spawn(move || {
            let config = if is_input {
                device_clone.default_input_config()
            } else {
                device_clone.default_output_config()
            };
            let _ = tx.send(config);
        });

        match rx.recv_timeout(timeout) {
            Ok(Ok(config)) => Ok(config.into()),
            Ok(Err(e)) => Err(anyhow!("Failed to get device config: {}", e)),
            Err(_) => bail!("Device config timed out after {:?}", timeout),
        }
    }

    /// Capture is observed only; nothing is routed to the speakers.
    fn build_capture_stream(
        device: &Device,
        timeout: Duration,
        mut assembler: BlockAssembler,
    ) -> anyhow::Result<Stream> {
        let config = Self::get_config_with_timeout(device, true, timeout)?;
        let channels = config.channels.max(1) as usize;

        device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    assembler.push_frames(data, channels);
                },
                |err| log::error!("Capture stream error: {}", err),
                None,
            )
            .context("Failed to build capture stream")
    }

    fn build_playback_stream(
        track: MediaTrack,
        muted: bool,
        timeout: Duration,
        mut assembler: BlockAssembler,
    ) -> anyhow::Result<Stream> {
        let device = cpal::default_host()
            .default_output_device()
            .ok_or_else(|| anyhow!("No output device for media playback"))?;
        let config = Self::get_config_with_timeout(&device, false, timeout)?;
        let channels = config.channels.max(1) as usize;
        let mut player = MediaPlayer::new(track, config.sample_rate.0);
        let mut finished = false;

        device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for frame in data.chunks_mut(channels) {
                        let sample = player.next_sample();
                        let out = if muted { 0.0 } else { sample };
                        frame.iter_mut().for_each(|s| *s = out);
                        assembler.push(sample);
                    }
                    if !finished && player.is_finished() {
                        finished = true;
                        log::info!("Media playback finished");
                    }
                },
                |err| log::error!("Playback stream error: {}", err),
                None,
            )
            .context("Failed to build playback stream")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assembler_emits_full_blocks() {
        let (tx, rx) = crossbeam_channel::bounded(4);
        let mut assembler = BlockAssembler::new(tx);

        for i in 0..(BLOCK_SIZE * 2 + 10) {
            assembler.push(i as f32);
        }

        let blocks: Vec<Vec<f32>> = rx.try_iter().collect();
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.len() == BLOCK_SIZE));
        assert_eq!(blocks[1][0], BLOCK_SIZE as f32);
    }

    #[test]
    fn test_assembler_mixes_to_mono() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let mut assembler = BlockAssembler::new(tx);

        let stereo: Vec<f32> = (0..BLOCK_SIZE).flat_map(|_| [1.0, 0.0]).collect();
        assembler.push_frames(&stereo, 2);

        let block = rx.try_recv().unwrap();
        assert!(block.iter().all(|&s| s == 0.5));
    }

    #[test]
    fn test_assembler_drops_when_full() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let mut assembler = BlockAssembler::new(tx);

        for _ in 0..(BLOCK_SIZE * 3) {
            assembler.push(0.0);
        }

        assert_eq!(rx.try_iter().count(), 1);
        assert_eq!(assembler.dropped, 2);
    }
}
