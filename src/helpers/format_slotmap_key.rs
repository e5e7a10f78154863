use std::fmt::Formatter;

/// Writes a key as name#index:version, or name#null
pub fn format_slotmap_key<T: slotmap::Key>(
    f: &mut Formatter,
    type_name: &str,
    key: T,
) -> std::fmt::Result {
    if key.is_null() {
        return write!(f, "{}#null", type_name);
    }
    // Relies on slotmap packing the version into the high half of the FFI value
    let raw = key.data().as_ffi();
    write!(f, "{}#{}:{}", type_name, raw & 0xffff_ffff, raw >> 32)
}
