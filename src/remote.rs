//! Infrared remote control input (NEC protocol).
//!
//! [`NecDecoder`] turns edge timings from an active-low IR receiver into
//! [`NecCode`]s. [`RemoteKeymap`] maps codes to [`Command`]s. On the device,
//! `Remote` (feature `pico1`) runs the decoder in a background task.

use heapless::LinearMap;

use crate::Command;

/// One decoded button press. Standard NEC frames carry an 8-bit address;
/// extended frames use both address bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NecCode {
    pub addr: u16,
    pub cmd: u8,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum DecoderState {
    #[default]
    Idle,
    LeaderLow,
    LeaderHigh,
    BitLow {
        index: u8,
        frame: u32,
    },
    BitHigh {
        index: u8,
        frame: u32,
    },
    StopBit(NecCode),
    RepeatTail,
}

// Pulse windows in µs.
const GLITCH: u32 = 120;
const MIN_IDLE: u32 = 5_000;
const LEADER_LOW: (u32, u32) = (7_000, 11_000);
const LEADER_HIGH: (u32, u32) = (3_500, 5_500);
const REPEAT_HIGH: (u32, u32) = (1_500, 3_000);
const BIT_LOW: (u32, u32) = (300, 900);
const BIT0_HIGH: (u32, u32) = (250, 900);
const BIT1_HIGH: (u32, u32) = (1_000, 2_400);

/// Edge-driven NEC frame decoder.
///
/// Feed it every edge of the receiver output: the level *after* the edge and
/// the time since the previous edge. A press is reported only after the stop
/// bit. Repeat frames are consumed and ignored.
///
/// ```
/// use pocket_wallclock::remote::{NecCode, NecDecoder};
///
/// let mut decoder = NecDecoder::new();
/// let mut result = None;
/// // idle, leader, 32 data bits (address 0x00, command 0x45), stop bit
/// let mut edges = vec![(true, 20_000), (false, 9_000), (true, 4_500)];
/// let frame = u32::from_le_bytes([0x00, 0xFF, 0x45, 0xBA]);
/// for bit in 0..32 {
///     edges.push((false, 560));
///     edges.push((true, if frame >> bit & 1 == 1 { 1_690 } else { 560 }));
/// }
/// edges.push((false, 560));
/// for (level_low, dt) in edges {
///     result = result.or(decoder.feed(level_low, dt));
/// }
/// assert_eq!(result, Some(NecCode { addr: 0x00, cmd: 0x45 }));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct NecDecoder {
    state: DecoderState,
}

impl NecDecoder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: DecoderState::Idle,
        }
    }

    /// Drop any partial frame.
    pub const fn reset(&mut self) {
        self.state = DecoderState::Idle;
    }

    /// Process one edge. `dt_us` is the duration of the level that just ended.
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "Bit index stays below 32"
    )]
    pub fn feed(&mut self, level_low: bool, dt_us: u32) -> Option<NecCode> {
        if dt_us < GLITCH {
            return None;
        }
        let (next, code) = match self.state {
            DecoderState::Idle => {
                if level_low && dt_us >= MIN_IDLE {
                    (DecoderState::LeaderLow, None)
                } else {
                    (DecoderState::Idle, None)
                }
            }
            DecoderState::LeaderLow => {
                if !level_low && within(dt_us, LEADER_LOW) {
                    (DecoderState::LeaderHigh, None)
                } else {
                    // Short pulses here are usually the stop bit of a previous frame.
                    if dt_us > 2_000 {
                        decode_failed("leader low", dt_us);
                    }
                    (DecoderState::Idle, None)
                }
            }
            DecoderState::LeaderHigh => {
                if level_low && within(dt_us, LEADER_HIGH) {
                    (DecoderState::BitLow { index: 0, frame: 0 }, None)
                } else if level_low && within(dt_us, REPEAT_HIGH) {
                    (DecoderState::RepeatTail, None)
                } else {
                    decode_failed("leader high", dt_us);
                    (DecoderState::Idle, None)
                }
            }
            DecoderState::RepeatTail => {
                if level_low || !within(dt_us, BIT_LOW) {
                    decode_failed("repeat tail", dt_us);
                }
                (DecoderState::Idle, None)
            }
            DecoderState::BitLow { index, frame } => {
                if !level_low && within(dt_us, BIT_LOW) {
                    (DecoderState::BitHigh { index, frame }, None)
                } else {
                    decode_failed("bit low", dt_us);
                    (DecoderState::Idle, None)
                }
            }
            DecoderState::BitHigh { index, frame } => {
                let bit = if level_low && within(dt_us, BIT1_HIGH) {
                    Some(1)
                } else if level_low && within(dt_us, BIT0_HIGH) {
                    Some(0)
                } else {
                    None
                };
                match bit {
                    None => {
                        decode_failed("bit high", dt_us);
                        (DecoderState::Idle, None)
                    }
                    Some(bit) => {
                        let frame = frame | (bit << index);
                        let index = index + 1;
                        if index < 32 {
                            (DecoderState::BitLow { index, frame }, None)
                        } else if let Some(code) = validate(frame) {
                            (DecoderState::StopBit(code), None)
                        } else {
                            #[cfg(feature = "defmt")]
                            defmt::debug!("IR: checksum failed, frame=0x{:08X}", frame);
                            (DecoderState::Idle, None)
                        }
                    }
                }
            }
            DecoderState::StopBit(code) => {
                if !level_low && within(dt_us, BIT_LOW) {
                    (DecoderState::Idle, Some(code))
                } else {
                    decode_failed("stop bit", dt_us);
                    (DecoderState::Idle, None)
                }
            }
        };
        self.state = next;
        code
    }
}

#[inline]
const fn within(value: u32, (low, high): (u32, u32)) -> bool {
    value >= low && value <= high
}

fn validate(frame: u32) -> Option<NecCode> {
    let [addr_low, addr_high, cmd, cmd_inverse] = frame.to_le_bytes();
    if cmd ^ cmd_inverse != 0xFF {
        return None;
    }
    let addr = if addr_low ^ addr_high == 0xFF {
        u16::from(addr_low)
    } else {
        u16::from_le_bytes([addr_low, addr_high])
    };
    Some(NecCode { addr, cmd })
}

#[cfg_attr(not(feature = "defmt"), expect(unused_variables, reason = "Only logged"))]
fn decode_failed(stage: &str, dt_us: u32) {
    #[cfg(feature = "defmt")]
    defmt::debug!("IR: decode failed at {} (dt={}µs)", stage, dt_us);
}

// ===== Keymap ===============================================================

/// Buttons of the common 21-key "Car MP3" remote (address 0x00).
pub const DEFAULT_REMOTE_BUTTONS: [(u16, u8, Command); 15] = [
    (0x00, 0x16, Command::Override(0)),
    (0x00, 0x0C, Command::Override(1)),
    (0x00, 0x18, Command::Override(2)),
    (0x00, 0x5E, Command::Override(3)),
    (0x00, 0x08, Command::Override(4)),
    (0x00, 0x1C, Command::Override(5)),
    (0x00, 0x5A, Command::Override(6)),
    (0x00, 0x42, Command::Override(7)),
    (0x00, 0x52, Command::Override(8)),
    (0x00, 0x4A, Command::Override(9)),
    (0x00, 0x45, Command::PowerOffNow),
    (0x00, 0x46, Command::ToggleAnimation),
    (0x00, 0x47, Command::ToggleFastTicks),
    (0x00, 0x43, Command::SwapWindows),
    (0x00, 0x09, Command::Exit),
];

/// Remote button to [`Command`] lookup.
pub struct RemoteKeymap<const N: usize> {
    map: LinearMap<NecCode, Command, N>,
}

impl<const N: usize> RemoteKeymap<N> {
    /// Build from `(address, command code, Command)` triples. Entries beyond
    /// `N` are dropped; a repeated code keeps its last mapping.
    #[must_use]
    pub fn new(buttons: &[(u16, u8, Command)]) -> Self {
        let mut map = LinearMap::new();
        for &(addr, cmd, command) in buttons {
            let _ = map.insert(NecCode { addr, cmd }, command);
        }
        Self { map }
    }

    #[must_use]
    pub fn command(&self, code: NecCode) -> Option<Command> {
        self.map.get(&code).copied()
    }

    /// Like [`Self::command`], with unmapped buttons as [`Command::KeyPress`].
    #[must_use]
    pub fn command_or_key_press(&self, code: NecCode) -> Command {
        self.command(code).unwrap_or(Command::KeyPress)
    }
}

impl Default for RemoteKeymap<15> {
    fn default() -> Self {
        Self::new(&DEFAULT_REMOTE_BUTTONS)
    }
}

// ===== Device ===============================================================

#[cfg(feature = "pico1")]
pub use device::{Remote, RemoteStatic};

#[cfg(feature = "pico1")]
mod device {
    use embassy_executor::Spawner;
    use embassy_rp::Peri;
    use embassy_rp::gpio::{AnyPin, Input, Pin, Pull};
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use embassy_sync::channel::Channel;
    use embassy_time::Instant;

    use super::{NecCode, NecDecoder, RemoteKeymap};
    use crate::{Command, Result};

    /// Static resources for [`Remote`].
    pub type RemoteStatic = Channel<CriticalSectionRawMutex, NecCode, 8>;

    /// An IR receiver on a GPIO pin, reporting mapped [`Command`]s.
    pub struct Remote<const N: usize> {
        codes: &'static RemoteStatic,
        keymap: RemoteKeymap<N>,
    }

    impl<const N: usize> Remote<N> {
        #[must_use]
        pub const fn new_static() -> RemoteStatic {
            Channel::new()
        }

        /// Start decoding on `pin` (receiver idles high).
        ///
        /// # Errors
        /// Returns an error if the background task cannot be spawned.
        pub fn new<P: Pin>(
            pin: Peri<'static, P>,
            keymap: RemoteKeymap<N>,
            codes: &'static RemoteStatic,
            spawner: Spawner,
        ) -> Result<Self> {
            let any: Peri<'static, AnyPin> = pin.into();
            let token = nec_task(Input::new(any, Pull::Up), codes)?;
            spawner.spawn(token);
            Ok(Self { codes, keymap })
        }

        /// Wait for the next button press. Unmapped buttons come back as
        /// [`Command::KeyPress`].
        pub async fn wait(&self) -> Command {
            let code = self.codes.receive().await;
            defmt::info!("IR: addr=0x{:04X} cmd=0x{:02X}", code.addr, code.cmd);
            self.keymap.command_or_key_press(code)
        }
    }

    #[embassy_executor::task]
    async fn nec_task(mut pin: Input<'static>, codes: &'static RemoteStatic) -> ! {
        let mut decoder = NecDecoder::new();
        let mut level_low = pin.is_low();
        let mut last_edge = Instant::now();

        loop {
            pin.wait_for_any_edge().await;
            let now = Instant::now();
            let dt_us = u32::try_from(now.duration_since(last_edge).as_micros()).unwrap_or(u32::MAX);
            last_edge = now;

            // Toggle rather than read, then resync if an edge was missed.
            level_low = !level_low;
            if level_low != pin.is_low() {
                level_low = pin.is_low();
                decoder.reset();
                continue;
            }

            if let Some(code) = decoder.feed(level_low, dt_us) {
                codes.send(code).await;
            }
        }
    }
}
