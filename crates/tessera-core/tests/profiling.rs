//! Profiling toggle tests.

use tessera_core::profiling::{ProfilingBackend, init_profiling, is_enabled, new_frame};

#[test]
fn test_in_process_backend_enables_scopes() {
    init_profiling(ProfilingBackend::InProcess);
    assert!(is_enabled());

    {
        tessera_core::profiling::profile_scope!("test_scope");
    }
    new_frame();
    puffin::set_scopes_on(false);
}
