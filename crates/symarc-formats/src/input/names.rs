//! Symbol name normalisation shared by the text adapters
//!
//! Rust (legacy and v0), Itanium C++ (`_Z`, or `__Z` on Mach-O) and MSVC
//! C++ (`?`) manglings are demangled. Names that look mangled but fail to
//! demangle are kept verbatim, without a `()` suffix.

use crate::input::AdapterOptions;
use msvc_demangler::DemangleFlags;

/// Demangle a Rust or C++ symbol
///
/// Returns `None` for plain names and for mangled names no demangler accepts.
pub fn demangle(name: &str) -> Option<String> {
    if let Ok(demangled) = rustc_demangle::try_demangle(name) {
        return Some(format!("{demangled:#}"));
    }

    if name.starts_with('?') {
        return msvc_demangler::demangle(name, DemangleFlags::llvm()).ok();
    }

    let itanium = name.strip_prefix('_').filter(|rest| rest.starts_with("_Z"));
    let itanium = itanium.unwrap_or(name);
    if itanium.starts_with("_Z") {
        return cpp_demangle::Symbol::new(itanium.as_bytes())
            .ok()
            .map(|symbol| symbol.to_string());
    }

    None
}

/// Whether `name` carries a C++ mangling prefix
pub fn is_mangled(name: &str) -> bool {
    name.starts_with('?') || name.starts_with("_Z") || name.starts_with("__Z")
}

/// Strip 32-bit MSVC C decoration
///
/// `_name` (cdecl), `_name@8` (stdcall) and `@name@8` (fastcall) become
/// `name`. C++ decorated names (`?...`) are returned unchanged.
pub fn strip_c_decoration(name: &str) -> &str {
    let undecorated = if let Some(rest) = name.strip_prefix('@') {
        rest
    } else if let Some(rest) = name.strip_prefix('_') {
        rest
    } else {
        return name;
    };

    match undecorated.rsplit_once('@') {
        Some((base, arg_bytes))
            if !base.is_empty()
                && !arg_bytes.is_empty()
                && arg_bytes.bytes().all(|b| b.is_ascii_digit()) =>
        {
            base
        }
        _ => undecorated,
    }
}

/// Apply the caller's naming convention and convert to archive bytes
pub fn finish(name: &str, options: &AdapterOptions) -> Vec<u8> {
    let mut out = name.as_bytes().to_vec();
    if options.append_parens && !name.contains('(') {
        out.extend_from_slice(b"()");
    }
    out
}

/// Demangle `raw` and apply the naming convention
pub fn normalize(raw: &str, options: &AdapterOptions) -> Vec<u8> {
    match demangle(raw) {
        Some(demangled) => finish(&demangled, options),
        None if is_mangled(raw) => raw.as_bytes().to_vec(),
        None => finish(raw, options),
    }
}
