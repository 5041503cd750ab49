//! 不透明随机 token

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;

/// 随机字节数（256 bit）
const TOKEN_BYTES: usize = 32;

/// 生成授权码 / access_token / refresh_token
pub fn generate_opaque_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
