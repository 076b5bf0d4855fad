//! 토큰 서명 키 저장소
//!
//! 토큰 종류(액세스/리프레시)별 서명·검증 키를 로드하고 프로세스 수명 동안 캐시합니다.
//!
//! # 특징
//!
//! - HS256(공유 비밀키)와 RS256(RSA 키 쌍) 지원
//! - 종류별 키는 최초 사용 시 한 번만 로드 (`once_cell::sync::OnceCell`), 실패는 캐시하지 않음
//! - 키 디렉토리 모드에서 키 파일이 없으면 RSA 키 쌍 자동 생성 (선택)
//! - JWKS(JSON Web Key Set) 표준으로 액세스 토큰 공개키 제공
//!
//! # RSA 키 생성
//!
//! ```bash
//! # 개인키 생성 (PKCS#1)
//! openssl genrsa -traditional -out access_private_key.pem 2048
//! # 공개키 추출 (SPKI)
//! openssl rsa -in access_private_key.pem -pubout -out access_public_key.pem
//! # 환경 변수용 base64 인코딩
//! base64 -w0 access_private_key.pem
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose, Engine as _};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use once_cell::sync::OnceCell;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

use crate::config::{JwtConfig, KeySource};
use crate::core::{AppError, AppResult};
use crate::domain::models::token::TokenClass;

/// 한 토큰 종류의 서명/검증 키 재료
pub struct ClassKeys {
    /// 이 종류에 허용되는 유일한 알고리즘
    pub algorithm: Algorithm,
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    /// 키 식별자 (RS256만)
    pub kid: Option<String>,
    /// JWKS용 공개키 (RS256만)
    public_key: Option<RsaPublicKey>,
}

impl ClassKeys {
    fn from_secret(secret: &str) -> Self {
        Self {
            algorithm: Algorithm::HS256,
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            kid: None,
            public_key: None,
        }
    }

    fn from_rsa_pem(class: TokenClass, private_pem: &str, public_pem: &str) -> AppResult<Self> {
        let private_key = RsaPrivateKey::from_pkcs1_pem(private_pem)
            .or_else(|_| RsaPrivateKey::from_pkcs8_pem(private_pem))
            .map_err(|e| key_error(class, format!("invalid RSA private key: {}", e)))?;
        let public_key = RsaPublicKey::from_public_key_pem(public_pem)
            .or_else(|_| RsaPublicKey::from_pkcs1_pem(public_pem))
            .map_err(|e| key_error(class, format!("invalid RSA public key: {}", e)))?;

        if private_key.to_public_key() != public_key {
            return Err(key_error(class, "RSA private and public keys do not match".to_string()));
        }

        let encoding = EncodingKey::from_rsa_pem(private_pem.as_bytes())
            .map_err(|e| key_error(class, format!("unusable RSA private key: {}", e)))?;
        let (n, e) = rsa_components(&public_key);
        let decoding = DecodingKey::from_rsa_components(&n, &e)
            .map_err(|err| key_error(class, format!("unusable RSA public key: {}", err)))?;

        let digest = format!("{:x}", Sha256::digest(public_key.n().to_bytes_be()));
        let kid = format!("{}-{}", class, &digest[..16]);

        Ok(Self {
            algorithm: Algorithm::RS256,
            encoding,
            decoding,
            kid: Some(kid),
            public_key: Some(public_key),
        })
    }

    /// JWKS 항목 (HS256이면 `None`)
    fn jwk(&self) -> Option<serde_json::Value> {
        let public_key = self.public_key.as_ref()?;
        let (n, e) = rsa_components(public_key);

        Some(serde_json::json!({
            "kty": "RSA",
            "use": "sig",
            "kid": self.kid,
            "n": n,
            "e": e,
            "alg": "RS256"
        }))
    }
}

/// base64url(no pad)로 인코딩한 RSA modulus/exponent
fn rsa_components(public_key: &RsaPublicKey) -> (String, String) {
    (
        general_purpose::URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be()),
        general_purpose::URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be()),
    )
}

fn key_error(class: TokenClass, message: String) -> AppError {
    AppError::KeyUnavailable(format!("{} key: {}", class, message))
}

/// 토큰 종류별 키 저장소
///
/// 애플리케이션 상태에 하나만 만들어 공유하며, 키는 읽기 전용으로 사용됩니다.
pub struct KeyStore {
    access_source: KeySource,
    refresh_source: KeySource,
    access: OnceCell<ClassKeys>,
    refresh: OnceCell<ClassKeys>,
}

impl KeyStore {
    pub fn new(access_source: KeySource, refresh_source: KeySource) -> Self {
        Self {
            access_source,
            refresh_source,
            access: OnceCell::new(),
            refresh: OnceCell::new(),
        }
    }

    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(config.access_key.clone(), config.refresh_key.clone())
    }

    /// 종류별 키를 가져옵니다. 최초 호출 시 로드합니다.
    ///
    /// # Errors
    ///
    /// * `AppError::KeyUnavailable` - 키 파일/PEM을 읽거나 해석할 수 없는 경우
    pub fn keys(&self, class: TokenClass) -> AppResult<&ClassKeys> {
        let (cell, source) = match class {
            TokenClass::Access => (&self.access, &self.access_source),
            TokenClass::Refresh => (&self.refresh, &self.refresh_source),
        };

        cell.get_or_try_init(|| {
            let keys = load_keys(class, source)?;
            log::info!("🔑 {} 토큰 키 로드 완료 ({:?})", class, keys.algorithm);
            Ok(keys)
        })
    }

    /// 모든 종류의 키를 미리 로드합니다. 시작 시 설정 오류를 드러내는 용도입니다.
    pub fn preload(&self) -> AppResult<()> {
        self.keys(TokenClass::Access)?;
        self.keys(TokenClass::Refresh)?;
        Ok(())
    }

    /// 액세스 토큰 공개키의 JWKS 표현
    ///
    /// # Returns
    ///
    /// * `Ok(Some(jwks))` - RS256 액세스 키
    /// * `Ok(None)` - 액세스 토큰이 HMAC 비밀키를 사용
    pub fn jwks(&self) -> AppResult<Option<serde_json::Value>> {
        let keys = self.keys(TokenClass::Access)?;
        Ok(keys.jwk().map(|jwk| serde_json::json!({ "keys": [jwk] })))
    }
}

fn load_keys(class: TokenClass, source: &KeySource) -> AppResult<ClassKeys> {
    match source {
        KeySource::Secret(secret) => {
            if secret.is_empty() {
                return Err(key_error(class, "empty secret".to_string()));
            }
            Ok(ClassKeys::from_secret(secret))
        }
        KeySource::RsaPem {
            private_pem,
            public_pem,
        } => ClassKeys::from_rsa_pem(class, private_pem, public_pem),
        KeySource::KeyDir {
            dir,
            generate_missing,
        } => {
            let (private_path, public_path) = key_paths(dir, class);

            if !private_path.exists() || !public_path.exists() {
                if !generate_missing {
                    return Err(key_error(
                        class,
                        format!("key files not found in {}", dir.display()),
                    ));
                }
                log::info!("🔑 {} 토큰 RSA 키가 없어 새로 생성합니다: {}", class, dir.display());
                generate_rsa_keys(class, &private_path, &public_path)?;
            }

            let private_pem = fs::read_to_string(&private_path).map_err(|e| {
                key_error(class, format!("failed to read {}: {}", private_path.display(), e))
            })?;
            let public_pem = fs::read_to_string(&public_path).map_err(|e| {
                key_error(class, format!("failed to read {}: {}", public_path.display(), e))
            })?;

            ClassKeys::from_rsa_pem(class, &private_pem, &public_pem)
        }
    }
}

/// 키 디렉토리 안의 `{class}_private_key.pem`, `{class}_public_key.pem` 경로
pub fn key_paths(dir: &Path, class: TokenClass) -> (PathBuf, PathBuf) {
    (
        dir.join(format!("{}_private_key.pem", class)),
        dir.join(format!("{}_public_key.pem", class)),
    )
}

/// RSA 키 쌍(2048비트)을 생성해 PEM 파일로 저장합니다.
fn generate_rsa_keys(class: TokenClass, private_path: &Path, public_path: &Path) -> AppResult<()> {
    let io_error = |e: std::io::Error| key_error(class, format!("failed to write key files: {}", e));

    if let Some(parent) = private_path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let private_key = RsaPrivateKey::new(&mut rsa::rand_core::OsRng, 2048)
        .map_err(|e| key_error(class, format!("RSA key generation failed: {}", e)))?;
    let public_key = private_key.to_public_key();

    // 개인키는 PKCS#1, 공개키는 SPKI 형식
    let private_pem = private_key
        .to_pkcs1_pem(rsa::pkcs1::LineEnding::LF)
        .map_err(|e| key_error(class, format!("failed to encode private key: {}", e)))?;
    let public_pem = public_key
        .to_public_key_pem(rsa::pkcs8::LineEnding::LF)
        .map_err(|e| key_error(class, format!("failed to encode public key: {}", e)))?;

    fs::write(private_path, private_pem.as_bytes()).map_err(io_error)?;
    fs::write(public_path, public_pem.as_bytes()).map_err(io_error)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(private_path, fs::Permissions::from_mode(0o600)).map_err(io_error)?;
        fs::set_permissions(public_path, fs::Permissions::from_mode(0o644)).map_err(io_error)?;
    }

    log::info!("📁 Private key saved: {}", private_path.display());
    log::info!("📁 Public key saved: {}", public_path.display());

    Ok(())
}
