#[cfg(test)]
mod __test__ {

  use crate::options::{ColorMode, FemtologOptions};

  #[test]
  fn test_default_options() {
    let opts = FemtologOptions::default();
    assert_eq!(opts.spsc_queue_size, 8 * 1024);
    assert_eq!(opts.backend_format_buffer_size, 2 * 1024);
    assert_eq!(opts.backend_dequeue_buffer_size, 4 * 1024);
    assert_eq!(opts.backend_worker_cpu_affinity, None);
    assert_eq!(opts.color_mode, ColorMode::Auto);
    assert!(opts.terminate_on_fatal);
  }

  #[test]
  fn test_presets() {
    let fast = FemtologOptions::fast();
    assert!(fast.spsc_queue_size > FemtologOptions::default().spsc_queue_size);
    assert_eq!(fast.backend_worker_cpu_affinity, Some(5));

    let small = FemtologOptions::memory_saving();
    assert!(small.spsc_queue_size <= FemtologOptions::default().spsc_queue_size);
    assert_eq!(small.backend_worker_cpu_affinity, None);
  }

  #[test]
  fn test_options_serde_round_trip() {
    let opts = FemtologOptions::fast();
    let json = serde_json::to_string(&opts).unwrap();
    let back: FemtologOptions = serde_json::from_str(&json).unwrap();
    assert_eq!(back.spsc_queue_size, opts.spsc_queue_size);
    assert_eq!(back.color_mode, opts.color_mode);
  }
}
