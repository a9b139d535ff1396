fn main() {
    std::process::exit(cli_timer::cli::timer_main());
}
