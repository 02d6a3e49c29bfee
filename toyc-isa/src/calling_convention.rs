//! Frame-offset constants shared by `toyc-gen` (which assigns them) and
//! `toyc-vm` (which only needs `SEGMENT_SIZE`, but keeps these visible
//! here rather than re-deriving them, for the same one-source-of-truth
//! reason the rest of this crate exists).

/// Cell count of each of the VM's three segments.
pub const SEGMENT_SIZE: usize = 8192;

/// A function's `i`-th (0-based, sorted-by-name) parameter sits at this
/// offset from `rbp`, below the saved `rbp` and return address that
/// `CALL`/`PUSH rbp` push in that order.
pub fn param_offset(argc: usize, i: usize) -> i64 {
    -2 - argc as i64 + i as i64
}

/// A function's `i`-th local variable sits at this offset from `rbp`,
/// above the frame base, in declaration order.
pub fn local_offset(i: usize) -> i64 {
    i as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_sit_below_saved_rbp_and_return_address() {
        assert_eq!(param_offset(2, 0), -4);
        assert_eq!(param_offset(2, 1), -3);
    }

    #[test]
    fn locals_sit_above_frame_base() {
        assert_eq!(local_offset(0), 0);
        assert_eq!(local_offset(3), 3);
    }
}
