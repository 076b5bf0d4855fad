/// 인증 모드를 정의하는 열거형
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// 인증이 반드시 필요함 (미인증 시 사유 코드와 함께 401)
    Required,
    /// 인증이 선택사항임 (있으면 검증, 없어도 익명으로 허용)
    Optional,
}

impl AuthMode {
    pub fn is_required(&self) -> bool {
        matches!(self, AuthMode::Required)
    }
}
