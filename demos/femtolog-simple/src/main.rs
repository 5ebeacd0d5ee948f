use femtolog::file_sink::FileSink;
use femtolog::options::ColorMode;
use femtolog::stdout_sink::StdoutSink;
use femtolog::{FemtologOptions, LogLevel, Logger};

fn main() {
  let mut logger = Logger::new();
  logger.init(&FemtologOptions {
    terminate_on_fatal: false,
    ..FemtologOptions::default()
  });

  logger.register_sink(StdoutSink::new(ColorMode::Auto));
  match FileSink::new("/tmp/femtolog-simple/app.log") {
    Ok(sink) => logger.register_sink(sink),
    Err(e) => eprintln!("file sink unavailable: {e}"),
  }

  logger.set_level(LogLevel::Debug);
  logger.start_worker();

  femtolog::raw!(logger, "--- femtolog simple demo ---\n");
  femtolog::info!(logger, "starting up, pid={}\n", std::process::id());

  for request in 0..5u32 {
    let latency_ms = 1.5 + request as f64 * 0.25;
    femtolog::debug!(logger, "request {} served in {}ms\n", request, latency_ms);
  }

  let user = String::from("duck");
  femtolog::warn!(logger, "user {} hit the rate limit ({} req/s)\n", user, 120u32);
  femtolog::error!(logger, "upstream returned status {}\n", 503u16);

  logger.flush();
  logger.stop_worker();

  println!(
    "enqueued={} dropped={}",
    logger.enqueued_count(),
    logger.dropped_count()
  );
}
