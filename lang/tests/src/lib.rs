pub mod utils {
    use roux_driver::{Conf, Session};
    use std::path::PathBuf;

    pub fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    pub fn wrapper_scm(path: impl Into<PathBuf>, name: &str) {
        init_logger();
        let path = path.into();
        log::info!("testing `{}`", path.display());
        let session = match Session::stdout(Conf::default()) {
            | Ok(session) => session,
            | Err(err) => panic!("{}", err.render()),
        };
        if let Err(err) = session.test_file(name, &path, false) {
            eprintln!("{}", err.render());
            panic!("Error running `{}`", path.display());
        }
    }
}

/// `scm_test!(group, name, "file")` runs `scm/group/file.scm` and expects
/// its last value to be `#t`.
#[macro_export]
macro_rules! scm_test {
    ($group:ident, $name:ident, $file:expr) => {
        #[test]
        fn $name() {
            let path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("scm")
                .join(stringify!($group))
                .join(format!("{}.scm", $file));
            ::roux_tests::utils::wrapper_scm(path, stringify!($name));
        }
    };
}
