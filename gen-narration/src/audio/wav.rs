//! WAV encoding and decoding with hound.

use std::io::BufWriter;
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WavError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV format error: {0}")]
    Format(#[from] hound::Error),

    #[error("Expected mono audio, got {0} channels")]
    NotMono(u16),
}

/// Write mono 16-bit PCM samples to `path`.
///
/// The file is encoded next to its destination and renamed into place, so
/// `path` either holds the complete WAV or is left untouched.
pub fn write_wav(path: &Path, samples: &[i16], sample_rate: u32) -> Result<(), WavError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir)?;

    {
        let mut writer = hound::WavWriter::new(BufWriter::new(temp.as_file_mut()), spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }

    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Read a mono WAV file as 16-bit samples, returning them with the sample rate.
///
/// Float and other integer widths are rescaled to 16 bits.
pub fn read_wav(path: &Path) -> Result<(Vec<i16>, u32), WavError> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    if spec.channels != 1 {
        return Err(WavError::NotMono(spec.channels));
    }

    let samples = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Float, _) => {
            let floats = reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?;
            super::f32_to_i16(&floats)
        }
        (hound::SampleFormat::Int, 16) => reader.samples::<i16>().collect::<Result<Vec<_>, _>>()?,
        (hound::SampleFormat::Int, bits) => reader
            .samples::<i32>()
            .map(|s| s.map(|s| rescale_to_i16(s, bits)))
            .collect::<Result<Vec<_>, _>>()?,
    };

    Ok((samples, spec.sample_rate))
}

fn rescale_to_i16(sample: i32, bits: u16) -> i16 {
    if bits > 16 {
        (sample >> (bits - 16)) as i16
    } else {
        (sample << (16 - bits)) as i16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.wav");

        write_wav(&path, &[0, 1000, -1000, i16::MAX, i16::MIN], 24_000).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 24_000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.duration(), 5);

        let (samples, rate) = read_wav(&path).unwrap();
        assert_eq!(rate, 24_000);
        assert_eq!(samples, vec![0, 1000, -1000, i16::MAX, i16::MIN]);
    }

    #[test]
    fn test_write_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("only.wav");
        write_wav(&path, &[1, 2, 3], 16_000).unwrap();

        let entries: Vec<_> = std::fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("out.wav");
        assert!(matches!(write_wav(&path, &[1], 16_000), Err(WavError::Io(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_read_float_wav() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("float.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 24_000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for s in [0.0f32, 1.0, -1.0] {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        let (samples, _) = read_wav(&path).unwrap();
        assert_eq!(samples, vec![0, i16::MAX, -i16::MAX]);
    }

    #[test]
    fn test_read_rejects_stereo() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("stereo.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 24_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        writer.write_sample(0i16).unwrap();
        writer.write_sample(0i16).unwrap();
        writer.finalize().unwrap();

        assert!(matches!(read_wav(&path), Err(WavError::NotMono(2))));
    }

    #[test]
    fn test_rescale_to_i16() {
        assert_eq!(rescale_to_i16((1 << 23) - 1, 24), i16::MAX);
        assert_eq!(rescale_to_i16(-(1 << 23), 24), i16::MIN);
        assert_eq!(rescale_to_i16(127, 8), 127 << 8);
    }
}
