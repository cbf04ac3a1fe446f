//! Titles of the tutorial steps served under `/test/stepN`.

use everydoc_core::pipeline::Single;

/// Number of tutorial steps.
pub const STEP_COUNT: u8 = 20;

const TITLES: [&str; STEP_COUNT as usize] = [
    "변수 선언과 컬렉션",
    "함수와 클로저",
    "타입과 객체",
    "빈 값 다루기",
    "컬렉션 연산",
    "언어 특징 요약",
    "확장 메서드",
    "스코프와 소유권",
    "왜 이 스택을 쓰는가",
    "논블로킹 웹 서버란",
    "Single과 Many 기초",
    "블로킹 vs 논블로킹",
    "핸들러와 서비스에서 파이프라인 쓰기",
    "프로젝트 구성",
    "리액티브 핸들러",
    "리액티브 서비스",
    "파일 업로드",
    "비동기 데이터베이스 접근",
    "테스트",
    "실전 패턴",
];

/// Static step titles.
#[derive(Debug, Clone, Copy, Default)]
pub struct TutorialCatalog;

impl TutorialCatalog {
    /// Title of `step`, if it exists.
    #[must_use]
    pub fn title(self, step: u8) -> Option<&'static str> {
        step.checked_sub(1)
            .and_then(|index| TITLES.get(usize::from(index)))
            .copied()
    }

    /// Page text for `step`. Empty for an unknown step.
    pub fn page(self, step: u8) -> Single<String> {
        Single::from_option(self.title(step)).map(move |title| format!("Step {step}: {title}"))
    }

    /// One-line summary for `step`. Empty for an unknown step.
    pub fn summary(self, step: u8) -> Single<String> {
        Single::from_option(self.title(step))
            .map(move |title| format!("[Step{step} summary] {title}"))
    }
}
