//! Multipart chunk sizing for s3cmd uploads.
//!
//! s3cmd uploads in 15 MB parts by default and the multipart protocol caps
//! an upload at 10,000 parts. Files up to 150 GB keep the default; larger
//! files get the smallest whole-megabyte chunk size that stays within the
//! part limit.

/// Default s3cmd chunk size in megabytes.
pub const DEFAULT_CHUNK_SIZE_MB: u64 = 15;

/// Maximum number of parts in a multipart upload.
pub const MAX_PARTS: u64 = 10_000;

/// Megabytes are decimal here, matching s3cmd.
const BYTES_PER_MB: u64 = 1_000_000;

/// Returns the chunk size (in MB) to request, or `None` to keep the default.
///
/// Computed as `ceil(size_in_mb / MAX_PARTS)` in integer arithmetic, so the
/// resulting part count never exceeds [`MAX_PARTS`].
pub fn multipart_chunk_size_mb(size_in_bytes: u64) -> Option<u64> {
    let threshold = DEFAULT_CHUNK_SIZE_MB * MAX_PARTS * BYTES_PER_MB;
    if size_in_bytes <= threshold {
        return None;
    }
    Some(size_in_bytes.div_ceil(MAX_PARTS * BYTES_PER_MB))
}

/// Returns the `--multipart-chunk-size-mb=<N>` argument for a file of the
/// given size, or `None` when s3cmd's default applies.
pub fn chunk_size_override(size_in_bytes: u64) -> Option<String> {
    multipart_chunk_size_mb(size_in_bytes).map(|mb| format!("--multipart-chunk-size-mb={}", mb))
}
