//! WAV export of finished recordings, used for debugging transcription
//! quality when `save_recordings_dir` is configured.

use std::path::Path;

use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use voxd_core::{CHANNELS, SAMPLE_RATE};

/// Writes a finished sample buffer to `path` as 16 kHz mono float WAV.
pub fn write_wav(path: &Path, samples: &[f32]) -> Result<()> {
    let spec = WavSpec {
        channels: CHANNELS,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer =
        WavWriter::create(path, spec).with_context(|| format!("Failed to create {:?}", path))?;
    for &sample in samples {
        writer
            .write_sample(sample)
            .with_context(|| format!("Failed to write sample to {:?}", path))?;
    }
    writer
        .finalize()
        .with_context(|| format!("Failed to finalize {:?}", path))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_wav_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recording.wav");
        let samples: Vec<f32> = (0..160).map(|i| (i as f32 / 160.0).sin()).collect();

        write_wav(&path, &samples).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, SAMPLE_RATE);
        assert_eq!(spec.channels, CHANNELS);
        let read: Vec<f32> = reader.into_samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(read.len(), samples.len());
    }
}
