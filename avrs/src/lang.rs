/// Invoked on `panic!` in the firmware.  Applications can supply their own
/// handler by enabling the `app_panic_handler` feature.
#[cfg(all(target_arch = "avr", not(feature = "app_panic_handler")))]
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    crate::avr::disable_interrupts();
    loop {}
}
