//! Host elevation query
//!
//! The launch executor picks its spawn path per item based on whether the
//! host process itself runs with elevated rights.

/// Whether the current process holds elevated rights (root on unix, an
/// elevated token on windows).
#[cfg(unix)]
pub fn host_is_elevated() -> bool {
    // geteuid has no failure mode
    unsafe { libc::geteuid() == 0 }
}

/// Whether the current process holds elevated rights (root on unix, an
/// elevated token on windows).
#[cfg(windows)]
pub fn host_is_elevated() -> bool {
    use windows_sys::Win32::Foundation::{CloseHandle, HANDLE};
    use windows_sys::Win32::Security::{
        GetTokenInformation, TokenElevation, TOKEN_ELEVATION, TOKEN_QUERY,
    };
    use windows_sys::Win32::System::Threading::{GetCurrentProcess, OpenProcessToken};

    unsafe {
        let mut token: HANDLE = 0;
        if OpenProcessToken(GetCurrentProcess(), TOKEN_QUERY, &mut token) == 0 {
            return false;
        }
        let mut elevation = TOKEN_ELEVATION { TokenIsElevated: 0 };
        let mut returned = 0u32;
        let ok = GetTokenInformation(
            token,
            TokenElevation,
            &mut elevation as *mut _ as *mut _,
            std::mem::size_of::<TOKEN_ELEVATION>() as u32,
            &mut returned,
        );
        CloseHandle(token);
        ok != 0 && elevation.TokenIsElevated != 0
    }
}
