//! Half-hour time-window indexing for a 48-slot day.
//!
//! Every calendar day is divided into 48 fixed half-hour windows. Internally
//! a window is addressed by a dense index `0..48`; its stable public
//! identifier is the integer key `hour * 60 + minute`. The formatted label
//! (`"HH:MM - HH:MM"`) exists only at the CSV boundary.

/// Number of half-hour windows in a day.
pub const SLOTS_PER_DAY: usize = 48;

/// Length of one window in minutes.
pub const SLOT_MINUTES: u32 = 30;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Returns the stable key for the window starting at `hour`:`minute`.
///
/// # Panics
///
/// Panics if `hour` is not in `0..24` or `minute` is not 0 or 30.
pub fn slot_key(hour: u32, minute: u32) -> u32 {
    assert!(hour < 24, "hour must be in 0..24");
    assert!(minute == 0 || minute == 30, "minute must be 0 or 30");
    hour * 60 + minute
}

/// Returns the key of the window at dense index `index` (`0..48`).
///
/// # Panics
///
/// Panics if `index >= SLOTS_PER_DAY`.
pub fn key_at(index: usize) -> u32 {
    assert!(index < SLOTS_PER_DAY, "slot index out of range");
    index as u32 * SLOT_MINUTES
}

/// Returns the dense index for a window key, or `None` if the key does not
/// name a half-hour boundary within the day.
pub fn index_of(key: u32) -> Option<usize> {
    if key < MINUTES_PER_DAY && key % SLOT_MINUTES == 0 {
        Some((key / SLOT_MINUTES) as usize)
    } else {
        None
    }
}

/// Formats the window at `index` as `"HH:MM - HH:MM"`, the label used in
/// meter CSV headers. The last window of the day ends at `"24:00"`.
pub fn label_at(index: usize) -> String {
    let start = key_at(index);
    let end = start + SLOT_MINUTES;
    format!(
        "{:02}:{:02} - {:02}:{:02}",
        start / 60,
        start % 60,
        end / 60,
        end % 60
    )
}

/// Parses a clock time `"HH:MM"` into minutes since midnight.
///
/// Accepts `"24:00"` (returned as 1440) so that period ends and the final
/// window label can name the end of the day.
pub fn parse_hhmm(text: &str) -> Option<u32> {
    let (h, m) = text.trim().split_once(':')?;
    let hour: u32 = h.parse().ok()?;
    let minute: u32 = m.parse().ok()?;
    if minute >= 60 {
        return None;
    }
    let total = hour * 60 + minute;
    if total > MINUTES_PER_DAY {
        return None;
    }
    Some(total)
}

/// Parses a meter CSV column label `"HH:MM - HH:MM"` into the window key of
/// its start time.
///
/// The end time must be exactly one window after the start; the final window
/// may end at either `"24:00"` or `"00:00"`.
pub fn parse_label(label: &str) -> Option<u32> {
    let (start_text, end_text) = label.split_once('-')?;
    let start = parse_hhmm(start_text)?;
    let end = parse_hhmm(end_text)?;
    index_of(start)?;
    let expected_end = start + SLOT_MINUTES;
    if end == expected_end || (expected_end == MINUTES_PER_DAY && end == 0) {
        Some(start)
    } else {
        None
    }
}
