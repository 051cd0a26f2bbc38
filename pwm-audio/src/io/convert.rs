//! PCM to duty-cycle conversion.
//!
//! Signed little-endian PCM of 8, 16 or 32 bits is offset to an unsigned,
//! duty-proportional value and scaled to the PWM duty resolution:
//!
//! ```text
//! duty = max(sample + (2^(bits-1) - 1), 0) >> (bits - resolution)   bits >= resolution
//! duty = (sample + 127) << (resolution - 8)                         8-bit, resolution > 8
//! ```
//!
//! ## Ring slot layout
//!
//! Every source sample becomes one slot in the ring. The slot width depends
//! only on the duty resolution, never on the source width:
//!
//! | Resolution | Slot | Bytes |
//! |------------|------|-------|
//! | 8 bits | `u8` | `[duty]` |
//! | 9–10 bits | `u16` | `[low, high]` |
//!
//! A frame holds one slot per source channel, left first. Mono-to-stereo
//! duplication and stereo-to-mono discard happen in the
//! [playback engine](super::playback), so the ring always carries exactly the
//! source's channel count.

use crate::config::Params;

/// Largest converted frame: two channels of two-byte slots.
pub const MAX_FRAME_BYTES: usize = 4;

/// Bytes per converted sample in the ring for a duty resolution.
pub const fn sample_width(duty_resolution: u8) -> usize {
    if duty_resolution > 8 {
        2
    } else {
        1
    }
}

/// Decode one signed little-endian sample of `bits` width.
///
/// `bytes` must hold exactly `bits / 8` bytes.
pub fn decode_sample(bytes: &[u8], bits: u8) -> i32 {
    match bits {
        8 => bytes[0] as i8 as i32,
        16 => i16::from_le_bytes([bytes[0], bytes[1]]) as i32,
        _ => i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
    }
}

/// Offset a signed sample to an unsigned duty value of `duty_resolution` bits.
///
/// The offset is half of full scale minus one (`+127`, `+32767`,
/// `+2^31 - 1`). The sum is floored at zero so the most negative code maps
/// to a zero duty instead of wrapping to full scale.
pub fn to_duty(sample: i32, bits: u8, duty_resolution: u8) -> u16 {
    let half_scale = (1i64 << (bits - 1)) - 1;
    let offset = (sample as i64 + half_scale).max(0) as u64;

    let shift = bits as i32 - duty_resolution as i32;
    let duty = if shift >= 0 {
        offset >> shift
    } else {
        offset << -shift
    };
    duty as u16
}

/// Frame encoder for one parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleConverter {
    bits: u8,
    channels: u8,
    duty_resolution: u8,
}

impl SampleConverter {
    pub const fn new(params: &Params, duty_resolution: u8) -> Self {
        SampleConverter {
            bits: params.bits,
            channels: params.channels,
            duty_resolution,
        }
    }

    /// Input bytes per interleaved source frame. This is also the alignment
    /// unit: a shorter trailing remainder is never converted.
    pub const fn frame_in(&self) -> usize {
        self.channels as usize * (self.bits as usize / 8)
    }

    /// Ring bytes produced per frame.
    pub const fn frame_out(&self) -> usize {
        self.channels as usize * sample_width(self.duty_resolution)
    }

    /// Convert one source frame into ring bytes.
    ///
    /// `frame` must be exactly [`frame_in()`](Self::frame_in) bytes. Returns
    /// the number of bytes written to `out`.
    pub fn encode_frame(&self, frame: &[u8], out: &mut [u8; MAX_FRAME_BYTES]) -> usize {
        debug_assert_eq!(frame.len(), self.frame_in());

        let width = sample_width(self.duty_resolution);
        let mut n = 0;
        for sample in frame.chunks_exact(self.bits as usize / 8) {
            let duty = to_duty(decode_sample(sample, self.bits), self.bits, self.duty_resolution);
            out[n..n + width].copy_from_slice(&duty.to_le_bytes()[..width]);
            n += width;
        }
        n
    }
}
