//! # Audio Output Ring
//!
//! The handoff point between this pipeline (which runs on its own
//! audio-clock-driven tick, pulling one [`crate::frame::Frame`] per
//! `Session::produce`/`pull_resampled` pair) and a sound-card callback,
//! which the spec treats as an external collaborator driven by its own
//! hardware-interrupt clock (design §1, §4.13). A lock-free SPSC ring
//! buffer is the boundary: the pipeline thread is the sole producer, the
//! sound-card callback is the sole consumer, and neither ever blocks the
//! other.

use rtrb::{Consumer, Producer, RingBuffer};

/// Producer half, owned by the pipeline thread.
pub struct AudioProducer {
    inner: Producer<f32>,
}

impl AudioProducer {
    /// Push as many interleaved samples from `frame` as there is room for.
    /// Returns the number of samples actually pushed; a short write means
    /// the consumer isn't draining fast enough and the rest is dropped
    /// rather than buffered without bound.
    pub fn push_samples(&mut self, samples: &[f32]) -> usize {
        let mut pushed = 0;
        for &sample in samples {
            if self.inner.push(sample).is_err() {
                break;
            }
            pushed += 1;
        }
        pushed
    }

    pub fn slots(&self) -> usize {
        self.inner.slots()
    }
}

/// Consumer half, owned by the sound-card callback.
pub struct AudioConsumer {
    inner: Consumer<f32>,
}

impl AudioConsumer {
    /// Fill `out` from the ring, zero-padding any samples the producer
    /// hasn't caught up with yet (an underrun, reported via the return
    /// value so the caller can count it).
    pub fn pull_samples(&mut self, out: &mut [f32]) -> usize {
        let mut pulled = 0;
        for slot in out.iter_mut() {
            match self.inner.pop() {
                Ok(sample) => {
                    *slot = sample;
                    pulled += 1;
                }
                Err(_) => *slot = 0.0,
            }
        }
        pulled
    }

    pub fn slots(&self) -> usize {
        self.inner.slots()
    }
}

/// Create a producer/consumer pair backed by a ring of `capacity` samples.
pub fn audio_ring(capacity: usize) -> (AudioProducer, AudioConsumer) {
    let (producer, consumer) = RingBuffer::new(capacity);
    (AudioProducer { inner: producer }, AudioConsumer { inner: consumer })
}
