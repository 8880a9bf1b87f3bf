//! mlock status and core dump disabling. Unix only.

use sesame_crypto_core::memory::{disable_core_dumps, SecretBuffer};

#[cfg(unix)]
#[test]
fn secret_buffer_reports_mlock_status() {
    // Containers often have a tiny RLIMIT_MEMLOCK, so only check the call
    // does not panic.
    let buf = SecretBuffer::new(b"mlock test data");
    eprintln!("mlock status: {}", buf.is_mlocked());
}

#[cfg(target_os = "linux")]
#[test]
fn mlock_increases_vmlck_on_linux() {
    let before = read_vmlck_kb();
    let buf = SecretBuffer::new(&vec![0xAA; 65_536]);
    if buf.is_mlocked() {
        let after = read_vmlck_kb();
        assert!(
            after >= before,
            "VmLck did not increase: before={before}KB, after={after}KB"
        );
    } else {
        eprintln!("mlock failed (likely insufficient quota), skipping VmLck check");
    }
}

#[cfg(target_os = "linux")]
fn read_vmlck_kb() -> u64 {
    let status = std::fs::read_to_string("/proc/self/status").unwrap();
    status
        .lines()
        .find_map(|line| line.strip_prefix("VmLck:"))
        .map(|rest| rest.trim().trim_end_matches(" kB").trim().parse().unwrap_or(0))
        .unwrap_or(0)
}

#[cfg(unix)]
#[test]
fn disable_core_dumps_sets_rlimit_zero() {
    disable_core_dumps().expect("disable_core_dumps should succeed");
    let mut limit = libc::rlimit {
        rlim_cur: 1,
        rlim_max: 1,
    };
    // SAFETY: valid rlimit pointer.
    let ret = unsafe { libc::getrlimit(libc::RLIMIT_CORE, &raw mut limit) };
    assert_eq!(ret, 0);
    assert_eq!(limit.rlim_cur, 0);
    assert_eq!(limit.rlim_max, 0);
}
