fn main() {
    std::process::exit(cli_timer::cli::stopwatch_main());
}
