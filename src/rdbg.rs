#[macro_export]
macro_rules! dbg_print {
	($fmt:literal$(, $opt:expr)*) => ({
		if cfg!(debug_assertions) {
			log::trace!(concat!("[{}:{}] ", $fmt), file!(), line!()$(, $opt)*);
		}
	})
}
