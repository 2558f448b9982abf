//! Contract bindings
//!
//! Generated from the fragments of the deployed ABIs this client actually
//! calls. The vault follows the ERC-4626 deposit/withdraw shape plus its
//! own statistics views; the token is a mintable mock ERC-20.

use ethers::prelude::abigen;

abigen!(
    DefiVault,
    r#"[
        function deposit(uint256 assets, address receiver) external returns (uint256)
        function withdraw(uint256 assets, address receiver, address owner) external returns (uint256)
        function totalAssets() external view returns (uint256)
        function totalYieldGenerated() external view returns (uint256)
        function totalDonatedToPublicGoods() external view returns (uint256)
        function estimatedAPY() external view returns (uint256)
        function getUserStats(address user) external view returns (uint256, uint256, uint256, uint256, uint256, uint256)
    ]"#
);

abigen!(
    MockUsdc,
    r#"[
        function approve(address spender, uint256 amount) external returns (bool)
        function allowance(address owner, address spender) external view returns (uint256)
        function balanceOf(address account) external view returns (uint256)
        function mint(address to, uint256 amount) external
    ]"#
);
