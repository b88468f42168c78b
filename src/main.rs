fn main() {
    devspace::cli::run()
}

#[cfg(test)]
mod tests {
    use devspace::cli::build_root_command;
    use devspace::domain::SharedFlags;
    use devspace::util::testing;
    use tracing::info;

    #[ctor::ctor]
    fn init() {
        testing::init_test_setup();
    }

    // https://docs.rs/clap/latest/clap/_derive/_tutorial/index.html#testing
    #[test]
    fn verify_cli() {
        let flags = SharedFlags::new();
        build_root_command(&flags).to_clap().debug_assert();
        info!("Debug mode: info");
    }
}
