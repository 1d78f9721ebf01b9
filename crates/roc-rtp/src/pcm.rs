//! # PCM Payload Codec
//!
//! Encodes/decodes the two wire sample formats (design §4.2): 16-bit
//! big-endian signed integer, and 32-bit big-endian IEEE float. Samples
//! are exchanged with the rest of the pipeline as `f32` in `[-1.0, 1.0]`.
//!
//! Encoding/decoding a frame is a transaction: [`PcmWriter::begin`] opens
//! a fixed byte budget (the destination packet's payload capacity),
//! `write_frame` is called once per sample frame until the budget is
//! exhausted, and [`PcmWriter::end`] reports how many bytes were actually
//! written. A `write_frame` call that would overrun the budget writes
//! nothing and reports the frame as not written, so the caller can stop
//! cleanly on a packet boundary rather than splitting a frame across two
//! packets.

/// The two wire sample formats this codec supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SampleFormat {
    Sint16Be,
    Float32Be,
}

impl SampleFormat {
    pub fn bytes_per_sample(self) -> usize {
        match self {
            SampleFormat::Sint16Be => 2,
            SampleFormat::Float32Be => 4,
        }
    }
}

fn encode_sample(format: SampleFormat, sample: f32, out: &mut [u8]) {
    match format {
        SampleFormat::Sint16Be => {
            let clamped = sample.clamp(-1.0, 1.0);
            let quantized = (clamped * i16::MAX as f32).round() as i16;
            out.copy_from_slice(&quantized.to_be_bytes());
        }
        SampleFormat::Float32Be => {
            out.copy_from_slice(&sample.to_be_bytes());
        }
    }
}

fn decode_sample(format: SampleFormat, input: &[u8]) -> f32 {
    match format {
        SampleFormat::Sint16Be => {
            let raw = i16::from_be_bytes([input[0], input[1]]);
            raw as f32 / i16::MAX as f32
        }
        SampleFormat::Float32Be => f32::from_be_bytes([input[0], input[1], input[2], input[3]]),
    }
}

/// Writes interleaved sample frames into a fixed-size byte buffer,
/// tracking how many bytes of the budget remain.
pub struct PcmWriter<'a> {
    format: SampleFormat,
    channel_count: usize,
    buf: &'a mut [u8],
    written: usize,
}

impl<'a> PcmWriter<'a> {
    /// Open a write transaction against `buf`, the destination payload's
    /// full capacity.
    pub fn begin(format: SampleFormat, channel_count: usize, buf: &'a mut [u8]) -> Self {
        PcmWriter {
            format,
            channel_count,
            buf,
            written: 0,
        }
    }

    fn frame_len(&self) -> usize {
        self.channel_count * self.format.bytes_per_sample()
    }

    /// Write one interleaved sample frame (`samples.len() == channel_count`).
    /// Returns `false`, writing nothing, if the frame would not fit in the
    /// remaining budget.
    pub fn write_frame(&mut self, samples: &[f32]) -> bool {
        debug_assert_eq!(samples.len(), self.channel_count);
        let frame_len = self.frame_len();
        if self.written + frame_len > self.buf.len() {
            return false;
        }
        let sample_len = self.format.bytes_per_sample();
        for (i, sample) in samples.iter().enumerate() {
            let start = self.written + i * sample_len;
            encode_sample(self.format, *sample, &mut self.buf[start..start + sample_len]);
        }
        self.written += frame_len;
        true
    }

    /// Close the transaction, reporting the number of bytes actually
    /// written.
    pub fn end(self) -> usize {
        self.written
    }
}

/// Reads interleaved sample frames back out of a received payload.
pub struct PcmReader<'a> {
    format: SampleFormat,
    channel_count: usize,
    buf: &'a [u8],
    pos: usize,
}

impl<'a> PcmReader<'a> {
    pub fn begin(format: SampleFormat, channel_count: usize, buf: &'a [u8]) -> Self {
        PcmReader {
            format,
            channel_count,
            buf,
            pos: 0,
        }
    }

    fn frame_len(&self) -> usize {
        self.channel_count * self.format.bytes_per_sample()
    }

    /// Number of whole frames remaining in the buffer.
    pub fn frames_remaining(&self) -> usize {
        (self.buf.len() - self.pos) / self.frame_len().max(1)
    }

    /// Read one interleaved sample frame into `out` (`out.len() ==
    /// channel_count`). Returns `false` if fewer than one full frame
    /// remains.
    pub fn read_frame(&mut self, out: &mut [f32]) -> bool {
        debug_assert_eq!(out.len(), self.channel_count);
        let frame_len = self.frame_len();
        if self.pos + frame_len > self.buf.len() {
            return false;
        }
        let sample_len = self.format.bytes_per_sample();
        for (i, slot) in out.iter_mut().enumerate() {
            let start = self.pos + i * sample_len;
            *slot = decode_sample(self.format, &self.buf[start..start + sample_len]);
        }
        self.pos += frame_len;
        true
    }

    pub fn end(self) -> usize {
        self.pos
    }
}

/// Remap one interleaved sample frame from `input`'s channel count to
/// `output`'s. Missing channels are up-mixed as silence; channels beyond
/// what `output` can hold are dropped. Used when a session's encoded
/// channel mask differs from the pipeline's output mask.
pub fn remap_channels(input: &[f32], output: &mut [f32]) {
    let shared = input.len().min(output.len());
    output[..shared].copy_from_slice(&input[..shared]);
    for sample in &mut output[shared..] {
        *sample = 0.0;
    }
}
