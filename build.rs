fn main() {
    if cfg!(feature = "aes-ni") && !cfg!(any(target_arch = "x86", target_arch = "x86_64")) {
        println!(
            "cargo:warning=`aes-ni` feature enabled on a non-x86(_64) target; \
             the AES-CTR PRF backend will fall back to a software implementation."
        );
    }
}
