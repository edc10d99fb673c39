use crate::Result;
use url::Url;

/// 分享链接里携带令牌的查询参数
pub const TOKEN_PARAM: &str = "key";

/// 生成给间谍首领的分享链接
pub fn share_link(base_url: &str, token: &str) -> Result<Url> {
    let mut url = Url::parse(base_url)
        .map_err(|e| crate::Error::Config(format!("无效的分享地址 {}: {}", base_url, e)))?;
    url.query_pairs_mut().append_pair(TOKEN_PARAM, token);
    Ok(url)
}

/// 接受完整的分享链接或裸令牌，返回令牌本身
pub fn token_from_input(input: &str) -> String {
    let input = input.trim();
    match Url::parse(input) {
        Ok(url) => url
            .query_pairs()
            .find(|(name, _)| name == TOKEN_PARAM)
            .map(|(_, value)| value.into_owned())
            .unwrap_or_else(|| input.to_string()),
        Err(_) => input.to_string(),
    }
}
